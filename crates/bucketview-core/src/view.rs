//! Table rows: what the renderer draws for one page window.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bucketview_model::{DELIMITER, Location};

use crate::fetcher::{bucket_view_url, object_url};
use crate::windower::PageWindow;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// What a row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// A common prefix inside the current bucket.
    Folder,
    /// A stored object.
    File,
    /// A bucket in a storage-root listing.
    Bucket,
}

/// Where activating a row leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RowTarget {
    /// Navigate into a folder.
    Folder {
        /// Folder to list.
        location: Location,
    },
    /// Download an object.
    Download {
        /// Object URL.
        url: String,
    },
    /// Enter a bucket.
    Bucket {
        /// The bucket's root folder.
        location: Location,
        /// Hosted browser view of that bucket.
        view_url: String,
    },
}

impl RowTarget {
    /// The location this target navigates to, if it is navigable in place.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Folder { location } | Self::Bucket { location, .. } => Some(location),
            Self::Download { .. } => None,
        }
    }

    /// Link for this target, if it has one.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Download { url } | Self::Bucket { view_url: url, .. } => Some(url),
            Self::Folder { .. } => None,
        }
    }
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    /// Folder, file or bucket.
    pub kind: RowKind,
    /// Text of the name column.
    pub name: String,
    /// What activating the row does.
    pub target: RowTarget,
    /// Last-modified (files) or creation date (buckets).
    pub last_modified: Option<DateTime<Utc>>,
    /// Object size in bytes, files only.
    pub size: Option<u64>,
    /// Cleared by the search filter; hidden rows are kept, not removed.
    pub visible: bool,
}

impl TableRow {
    /// Text of the size column: blank for folders and buckets.
    #[must_use]
    pub fn size_text(&self) -> String {
        match self.kind {
            RowKind::File => format_size(self.size),
            RowKind::Folder | RowKind::Bucket => String::new(),
        }
    }

    /// Text of the date column: blank when unknown.
    #[must_use]
    pub fn modified_text(&self) -> String {
        self.last_modified
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

/// Turn one page window into table rows in display order.
///
/// A prefix (or folder-marker key) equal to the listed folder is skipped, it
/// would point back at the current location.
#[must_use]
pub fn build_rows(window: &PageWindow<'_>, location: &Location, endpoint: &str) -> Vec<TableRow> {
    let mut rows = Vec::with_capacity(window.len());

    for prefix in window.displayed_prefixes {
        if *prefix == location.path {
            continue;
        }
        rows.push(TableRow {
            kind: RowKind::Folder,
            name: display_name(prefix).to_owned(),
            target: RowTarget::Folder {
                location: location.with_path(prefix),
            },
            last_modified: None,
            size: None,
            visible: true,
        });
    }

    for object in window.displayed_objects {
        if object.key == location.path {
            continue;
        }
        rows.push(TableRow {
            kind: RowKind::File,
            name: display_name(&object.key).to_owned(),
            target: RowTarget::Download {
                url: object_url(endpoint, &location.bucket, &object.key),
            },
            last_modified: object.last_modified,
            size: object.size,
            visible: true,
        });
    }

    for bucket in window.displayed_buckets {
        rows.push(TableRow {
            kind: RowKind::Bucket,
            name: bucket.name.clone(),
            target: RowTarget::Bucket {
                location: Location::root(bucket.name.clone()),
                view_url: bucket_view_url(endpoint, &bucket.name),
            },
            last_modified: bucket.created_at,
            size: None,
            visible: true,
        });
    }

    rows
}

/// Last path segment of a key, ignoring one trailing delimiter.
#[must_use]
pub fn display_name(key: &str) -> &str {
    let trimmed = key.strip_suffix(DELIMITER).unwrap_or(key);
    trimmed.rsplit(DELIMITER).next().unwrap_or(trimmed)
}

/// Human-readable size with two decimals, `"Unknown"` when absent.
///
/// # Examples
///
/// ```
/// use bucketview_core::view::format_size;
///
/// assert_eq!(format_size(Some(1536)), "1.50 KB");
/// assert_eq!(format_size(None), "Unknown");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(size: Option<u64>) -> String {
    let Some(bytes) = size else {
        return String::from("Unknown");
    };

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", SIZE_UNITS[unit])
}
