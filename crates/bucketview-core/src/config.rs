//! Browser configuration.
//!
//! Provides [`BrowserConfig`]. Values are loaded from environment variables,
//! falling back to defaults that match the hosted listing endpoint.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use bucketview_model::DEFAULT_ITEMS_PER_PAGE;

/// Asset names the hosted UI ships inside the bucket it browses.
pub const DEFAULT_RESERVED_KEYS: [&str; 3] = ["index.html", "s3.js", "dark-mode.css"];

/// Browser configuration.
///
/// # Examples
///
/// ```
/// use bucketview_core::config::BrowserConfig;
///
/// let config = BrowserConfig::default();
/// assert_eq!(config.items_per_page, 50);
/// assert!(config.is_reserved("s3.js"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct BrowserConfig {
    /// Scheme and host of the listing endpoint (e.g. `"https://s3.example.com"`).
    #[builder(default = String::from("https://localhost"))]
    pub endpoint: String,

    /// Rows per rendered page.
    #[builder(default = DEFAULT_ITEMS_PER_PAGE)]
    pub items_per_page: usize,

    /// Keys that are never listed, matched exactly against the full key.
    #[builder(default = default_reserved_keys())]
    pub reserved_keys: Vec<String>,

    /// HTTP request timeout in seconds; `0` disables the timeout.
    #[builder(default = 30)]
    pub request_timeout_secs: u64,

    /// Where the theme preference is stored. `None` uses the home directory.
    #[builder(default)]
    pub preferences_path: Option<PathBuf>,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("https://localhost"),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            reserved_keys: default_reserved_keys(),
            request_timeout_secs: 30,
            preferences_path: None,
            log_level: String::from("info"),
        }
    }
}

impl BrowserConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `BUCKETVIEW_ENDPOINT` | `https://localhost` |
    /// | `BUCKETVIEW_ITEMS_PER_PAGE` | `50` |
    /// | `BUCKETVIEW_RESERVED_KEYS` | `index.html,s3.js,dark-mode.css` |
    /// | `BUCKETVIEW_REQUEST_TIMEOUT_SECS` | `30` |
    /// | `BUCKETVIEW_PREFERENCES_PATH` | `~/.bucketview/preferences.json` |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("BUCKETVIEW_ENDPOINT") {
            config.endpoint = v;
        }
        if let Ok(v) = std::env::var("BUCKETVIEW_ITEMS_PER_PAGE") {
            if let Ok(n) = v.parse::<usize>() {
                if n > 0 {
                    config.items_per_page = n;
                }
            }
        }
        if let Ok(v) = std::env::var("BUCKETVIEW_RESERVED_KEYS") {
            config.reserved_keys = parse_list(&v);
        }
        if let Ok(v) = std::env::var("BUCKETVIEW_REQUEST_TIMEOUT_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.request_timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("BUCKETVIEW_PREFERENCES_PATH") {
            config.preferences_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Whether `key` is one of the reserved asset names.
    #[must_use]
    pub fn is_reserved(&self, key: &str) -> bool {
        self.reserved_keys.iter().any(|k| k == key)
    }

    /// Request timeout, or `None` when disabled.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// The preference file path, defaulting to `~/.bucketview/preferences.json`.
    #[must_use]
    pub fn resolved_preferences_path(&self) -> Option<PathBuf> {
        self.preferences_path.clone().or_else(|| {
            dirs::home_dir().map(|home| home.join(".bucketview").join("preferences.json"))
        })
    }

    /// Endpoint without trailing slashes.
    #[must_use]
    pub fn endpoint_base(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

fn default_reserved_keys() -> Vec<String> {
    DEFAULT_RESERVED_KEYS.iter().map(|k| (*k).to_owned()).collect()
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
