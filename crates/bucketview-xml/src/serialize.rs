//! Listing XML serialization.
//!
//! Writes the same documents [`crate::deserialize`] reads: the delimiter
//! listing (`ListBucketResult`), the storage-root bucket listing
//! (`ListAllMyBucketsResult`) and the `<Error>` body of failed requests,
//! following the S3 RestXml conventions.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesText, Event};

use bucketview_model::{BucketEntry, DELIMITER, ListingPage, ObjectEntry};

use crate::deserialize::{ErrorBody, LIST_ALL_MY_BUCKETS_RESULT, LIST_BUCKET_RESULT};
use crate::error::XmlError;

/// The S3 XML namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Trait for serializing listing types to XML.
///
/// Implementors write their content as child elements inside the current XML
/// context. The root element and namespace are handled by [`to_xml`].
///
/// Uses `io::Result` because `quick_xml::Writer` closures require `io::Result<()>`.
pub trait XmlSerialize {
    /// Serialize this value as XML child elements into the given writer.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as a complete document with declaration and namespace.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_xml<T: XmlSerialize>(root_element: &str, value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(quick_xml::events::BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        None,
    )))?;

    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

/// Write a delimiter listing of `bucket` under `prefix`.
///
/// Buckets in `page` are ignored; use [`buckets_to_xml`] for root listings.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn listing_to_xml(page: &ListingPage, bucket: &str, prefix: &str) -> Result<Vec<u8>, XmlError> {
    to_xml(
        LIST_BUCKET_RESULT,
        &ListBucketDocument {
            bucket,
            prefix,
            page,
        },
    )
}

/// Write a storage-root listing of the buckets in `page`.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn buckets_to_xml(page: &ListingPage) -> Result<Vec<u8>, XmlError> {
    to_xml(LIST_ALL_MY_BUCKETS_RESULT, &BucketsDocument(page))
}

/// Write the `<Error>` document that accompanies a non-2xx listing response.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn error_to_xml(body: &ErrorBody) -> Result<Vec<u8>, XmlError> {
    to_xml("Error", body)
}

// ---------------------------------------------------------------------------
// Helper functions for writing common XML patterns
// ---------------------------------------------------------------------------

/// Write a simple `<tag>text</tag>` element.
fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Write `<tag>text</tag>` only if the value is `Some`.
fn write_optional_text<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<&str>,
) -> io::Result<()> {
    if let Some(v) = value {
        write_text_element(writer, tag, v)?;
    }
    Ok(())
}

/// Write `<tag>value</tag>` for an optional timestamp.
fn write_optional_timestamp<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<&chrono::DateTime<chrono::Utc>>,
) -> io::Result<()> {
    if let Some(dt) = value {
        write_text_element(writer, tag, &format_timestamp(dt))?;
    }
    Ok(())
}

/// Format a timestamp the way S3 does: `2006-02-03T16:45:09.000Z`.
fn format_timestamp(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

// ---------------------------------------------------------------------------
// XmlSerialize implementations
// ---------------------------------------------------------------------------

struct ListBucketDocument<'a> {
    bucket: &'a str,
    prefix: &'a str,
    page: &'a ListingPage,
}

struct BucketsDocument<'a>(&'a ListingPage);

impl XmlSerialize for ObjectEntry {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Contents").write_inner_content(|w| {
            write_text_element(w, "Key", &self.key)?;
            write_optional_timestamp(w, "LastModified", self.last_modified.as_ref())?;
            if let Some(size) = self.size {
                write_text_element(w, "Size", &size.to_string())?;
            }
            write_text_element(w, "StorageClass", "STANDARD")?;
            Ok(())
        })?;
        Ok(())
    }
}

impl XmlSerialize for BucketEntry {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Bucket").write_inner_content(|w| {
            write_text_element(w, "Name", &self.name)?;
            write_optional_timestamp(w, "CreationDate", self.created_at.as_ref())?;
            Ok(())
        })?;
        Ok(())
    }
}

impl XmlSerialize for ErrorBody {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Code", &self.code)?;
        write_optional_text(writer, "Message", self.message.as_deref())
    }
}

impl XmlSerialize for ListBucketDocument<'_> {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        let page = self.page;
        let key_count = page.prefixes.len() + page.objects.len();

        write_text_element(writer, "Name", self.bucket)?;
        write_text_element(writer, "Prefix", self.prefix)?;
        write_text_element(writer, "KeyCount", &key_count.to_string())?;
        write_text_element(writer, "MaxKeys", "1000")?;
        write_text_element(writer, "Delimiter", &DELIMITER.to_string())?;
        write_text_element(
            writer,
            "IsTruncated",
            if page.is_truncated || page.has_more() {
                "true"
            } else {
                "false"
            },
        )?;
        write_optional_text(
            writer,
            "NextContinuationToken",
            page.next_continuation_token.as_deref(),
        )?;
        for obj in &page.objects {
            obj.serialize_xml(writer)?;
        }
        for prefix in &page.prefixes {
            writer
                .create_element("CommonPrefixes")
                .write_inner_content(|w| write_text_element(w, "Prefix", prefix))?;
        }
        Ok(())
    }
}

impl XmlSerialize for BucketsDocument<'_> {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Buckets").write_inner_content(|w| {
            for bucket in &self.0.buckets {
                bucket.serialize_xml(w)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}
