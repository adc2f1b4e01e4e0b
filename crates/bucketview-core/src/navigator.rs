//! Path navigation: breadcrumb reconstruction from the current location.

use bucketview_model::{BreadcrumbEntry, DELIMITER, Location};

/// Label of the fixed crumb rendered before the trail.
pub const HOME_LABEL: &str = "Home";

/// Target of the fixed "Home" crumb: the storage-root view.
pub const HOME_PATH: &str = "/list/view";

/// Absolute link of the "Home" crumb on `endpoint`.
#[must_use]
pub fn home_url(endpoint: &str) -> String {
    format!("{}{HOME_PATH}", endpoint.trim_end_matches('/'))
}

/// Rebuild the breadcrumb trail for `location`.
///
/// `bucket/path` is split into non-empty segments. Every segment except the
/// last becomes a navigable entry whose target is the cumulative prefix of
/// the path segments up to and including it; the bucket segment itself never
/// contributes to that prefix, so its target is the bucket root. The last
/// segment marks the current folder and has no target. A cumulative prefix
/// equal to `bucket + "/"` is normalised to the bucket root as well.
///
/// # Examples
///
/// ```
/// use bucketview_core::navigator::breadcrumb;
/// use bucketview_model::Location;
///
/// let trail = breadcrumb(&Location::new("photos", "2024/jan/"));
/// let targets: Vec<_> = trail.iter().map(|c| c.path.as_deref()).collect();
/// assert_eq!(targets, vec![Some(""), Some("2024/"), None]);
/// ```
#[must_use]
pub fn breadcrumb(location: &Location) -> Vec<BreadcrumbEntry> {
    let full = format!("{}{DELIMITER}{}", location.bucket, location.path);
    let parts: Vec<&str> = full.split(DELIMITER).filter(|p| !p.is_empty()).collect();
    let bucket_root = format!("{}{DELIMITER}", location.bucket);

    let mut trail = Vec::with_capacity(parts.len());
    let mut crumb_path = String::new();

    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            crumb_path.push_str(part);
            crumb_path.push(DELIMITER);
        }

        let path = if index + 1 == parts.len() {
            None
        } else if crumb_path == bucket_root {
            Some(String::new())
        } else {
            Some(crumb_path.clone())
        };

        trail.push(BreadcrumbEntry {
            label: (*part).to_owned(),
            path,
        });
    }

    trail
}

/// Resolve a breadcrumb entry to the location it navigates to.
#[must_use]
pub fn crumb_target(location: &Location, entry: &BreadcrumbEntry) -> Option<Location> {
    entry
        .path
        .as_deref()
        .map(|path| Location::new(location.bucket.clone(), path))
}
