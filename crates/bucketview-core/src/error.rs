//! Error types for listing requests and preference storage.
//!
//! Every listing failure is scoped to one request: the controller turns it
//! into a banner message and the user can retry by navigating again.

use std::fmt;

use bucketview_xml::XmlError;

/// The two failure classes a listing request can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-2xx status or network failure.
    FetchError,
    /// The response body was not a usable listing document.
    ParseError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchError => f.write_str("FetchError"),
            Self::ParseError => f.write_str("ParseError"),
        }
    }
}

/// A failed listing request.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// The endpoint answered with a non-success status.
    #[error("{status}{}", code_suffix(.code))]
    Fetch {
        /// HTTP status code.
        status: u16,
        /// Provider error code from the `<Error>` body, if one was sent.
        code: Option<String>,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    /// The body could not be parsed as a listing.
    #[error("invalid listing response: {0}")]
    Parse(#[from] XmlError),
}

impl ListingError {
    /// Which of the two failure classes this is.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch { .. } | Self::Transport(_) => ErrorKind::FetchError,
            Self::Parse(_) => ErrorKind::ParseError,
        }
    }

    /// HTTP status for `Fetch` errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text for the user-visible error banner.
    #[must_use]
    pub fn banner(&self) -> String {
        format!("Error fetching objects: {self}")
    }
}

impl From<reqwest::Error> for ListingError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[allow(clippy::ref_option)]
fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|code| format!(" ({code})"))
        .unwrap_or_default()
}

/// Failure reading or writing the preference file.
#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    /// No path was configured and no home directory could be found.
    #[error("no location available for the preference file")]
    NoPath,

    /// File system error.
    #[error("preference file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file did not contain valid JSON.
    #[error("preference file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
