//! Persisted display preference (the dark theme toggle).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::BrowserConfig;
use crate::error::PreferencesError;

/// On-disk shape of the preference file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Dark theme enabled.
    #[serde(default)]
    pub dark_mode: bool,
}

/// Reads and writes [`Preferences`] as JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured or default location.
    pub fn from_config(config: &BrowserConfig) -> Result<Self, PreferencesError> {
        config
            .resolved_preferences_path()
            .map(Self::new)
            .ok_or(PreferencesError::NoPath)
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences. A missing or unreadable file yields the defaults.
    #[must_use]
    pub fn load(&self) -> Preferences {
        match self.try_load() {
            Ok(prefs) => prefs,
            Err(PreferencesError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no preference file, using defaults");
                Preferences::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable preference file");
                Preferences::default()
            }
        }
    }

    /// Load preferences, surfacing I/O and JSON errors.
    pub fn try_load(&self) -> Result<Preferences, PreferencesError> {
        let raw = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Write preferences, creating the parent directory if needed.
    pub fn save(&self, prefs: Preferences) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(&prefs)?;
        std::fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), dark_mode = prefs.dark_mode, "saved preferences");
        Ok(())
    }

    /// Current theme flag.
    #[must_use]
    pub fn dark_mode(&self) -> bool {
        self.load().dark_mode
    }

    /// Persist a new theme flag.
    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), PreferencesError> {
        let mut prefs = self.load();
        prefs.dark_mode = enabled;
        self.save(prefs)
    }
}
