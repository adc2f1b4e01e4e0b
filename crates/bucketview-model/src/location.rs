//! The current browsing position: a bucket plus a folder prefix.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Path delimiter used by every listing request.
pub const DELIMITER: char = '/';

/// A folder inside a bucket.
///
/// `path` is either empty (the bucket root) or a `/`-terminated prefix; it
/// never names a single object. An empty `bucket` means no bucket has been
/// selected yet, in which case listings go to the storage root and return
/// bucket entries instead of keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Bucket name, empty at the storage root.
    pub bucket: String,
    /// Folder prefix, empty or ending in `/`.
    pub path: String,
}

impl Location {
    /// Create a location, normalising `path` into folder form.
    ///
    /// Leading delimiters are stripped and a trailing one is appended when
    /// missing, so `"a/b"`, `"/a/b"` and `"a/b/"` all name the same folder.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucketview_model::Location;
    ///
    /// let loc = Location::new("photos", "/2024/jan");
    /// assert_eq!(loc.path, "2024/jan/");
    /// ```
    #[must_use]
    pub fn new(bucket: impl Into<String>, path: impl AsRef<str>) -> Self {
        Self {
            bucket: bucket.into(),
            path: normalize_path(path.as_ref()),
        }
    }

    /// The root folder of `bucket`.
    #[must_use]
    pub fn root(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            path: String::new(),
        }
    }

    /// Whether this is the top level of a bucket.
    #[must_use]
    pub fn is_bucket_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Whether no bucket is selected.
    #[must_use]
    pub fn is_storage_root(&self) -> bool {
        self.bucket.is_empty()
    }

    /// The enclosing folder, or `None` at the bucket root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.path.is_empty() {
            return None;
        }

        let parent = self
            .path
            .trim_end_matches(DELIMITER)
            .rsplit_once(DELIMITER)
            .map(|(parent, _)| format!("{parent}{DELIMITER}"))
            .unwrap_or_default();

        Some(Self {
            bucket: self.bucket.clone(),
            path: parent,
        })
    }

    /// A folder in the same bucket, addressed by its full prefix.
    #[must_use]
    pub fn with_path(&self, prefix: &str) -> Self {
        Self::new(self.bucket.clone(), prefix)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{DELIMITER}{}", self.bucket, self.path)
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_start_matches(DELIMITER);
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.ends_with(DELIMITER) {
        trimmed.to_owned()
    } else {
        format!("{trimmed}{DELIMITER}")
    }
}
