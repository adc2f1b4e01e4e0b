//! Listing request and response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::{DELIMITER, Location};

/// One list request against the storage endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    /// HTTP label (URI path). Empty for the storage root.
    pub bucket: String,
    /// HTTP query: `prefix`. Omitted from the URL when empty.
    pub prefix: String,
    /// HTTP query: `delimiter`.
    pub delimiter: char,
    /// HTTP query: `continuation-token`.
    pub continuation_token: Option<String>,
}

impl ListingQuery {
    /// First-page query for a location.
    #[must_use]
    pub fn for_location(location: &Location) -> Self {
        Self {
            bucket: location.bucket.clone(),
            prefix: location.path.clone(),
            delimiter: DELIMITER,
            continuation_token: None,
        }
    }

    /// Follow-up query resuming after `token`.
    #[must_use]
    pub fn continue_from(location: &Location, token: impl Into<String>) -> Self {
        Self {
            continuation_token: Some(token.into()),
            ..Self::for_location(location)
        }
    }
}

/// A stored object as reported by the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Full object key.
    pub key: String,
    /// `LastModified`, when the provider sent a value.
    pub last_modified: Option<DateTime<Utc>>,
    /// `Size` in bytes, `None` when missing or unparseable.
    pub size: Option<u64>,
}

/// A bucket entry, only present in storage-root listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketEntry {
    /// Bucket name.
    pub name: String,
    /// `CreationDate`, when present.
    pub created_at: Option<DateTime<Utc>>,
}

/// Parsed result of one listing response.
///
/// Never cached across locations: the controller keeps one per location and
/// drops it on navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPage {
    /// Sub-folder prefixes, each ending in `/`.
    pub prefixes: Vec<String>,
    /// Objects directly under the listed prefix.
    pub objects: Vec<ObjectEntry>,
    /// Buckets (storage-root listings only).
    pub buckets: Vec<BucketEntry>,
    /// Token for the next server-side page, if any.
    pub next_continuation_token: Option<String>,
    /// Whether the provider reported the listing as truncated.
    pub is_truncated: bool,
}

impl ListingPage {
    /// Total number of displayable entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefixes.len() + self.objects.len() + self.buckets.len()
    }

    /// Whether the listing has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the provider has more results beyond this page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_continuation_token.is_some()
    }

    /// Append a follow-up page, adopting its continuation state.
    pub fn extend(&mut self, next: ListingPage) {
        self.prefixes.extend(next.prefixes);
        self.objects.extend(next.objects);
        self.buckets.extend(next.buckets);
        self.next_continuation_token = next.next_continuation_token;
        self.is_truncated = next.is_truncated;
    }
}
