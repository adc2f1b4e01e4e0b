//! XML layer for object-storage listing documents.
//!
//! The listing endpoint speaks the S3 RestXml dialect: a `ListBucketResult`
//! document for delimiter listings inside a bucket, `ListAllMyBucketsResult`
//! at the storage root, and a flat `<Error>` document on failures. This crate
//! reads those documents into [`bucketview_model`] types and can write them
//! back out, which is what the fixture servers in the test suite do.
//!
//! # Key components
//!
//! - [`parse_listing`] for turning a response body into a [`ListingPage`]
//! - [`parse_error_body`] for the provider's `<Error>` documents
//! - [`listing_to_xml`], [`buckets_to_xml`] and [`error_to_xml`] for writing
//!
//! # Conventions
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - Booleans: lowercase `true`/`false`
//! - Timestamps: ISO 8601 (`2006-02-03T16:45:09.000Z`)
//!
//! [`ListingPage`]: bucketview_model::ListingPage

pub mod deserialize;
pub mod error;
pub mod serialize;

pub use deserialize::{ErrorBody, XmlDeserialize, parse_error_body, parse_listing};
pub use error::XmlError;
pub use serialize::{
    S3_NAMESPACE, XmlSerialize, buckets_to_xml, error_to_xml, listing_to_xml, to_xml,
};
