//! Durable user preferences.
//!
//! Stores the preferred output device and behaviour flags across agent
//! restarts. The store is the sole owner of the record: every mutation
//! is written back synchronously, and writes go through a temp file +
//! rename so a later load never sees a partial record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::paths;
use crate::error::PreferencesError;

/// Persisted preference record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Name of the device to re-apply on launch. Names are the stable
    /// identity; ordinal device ids are never persisted.
    #[serde(default)]
    pub preferred_device: Option<String>,

    /// Switch to the preferred device when the agent starts.
    #[serde(default)]
    pub change_on_run: bool,

    /// Exit after an autorun-triggered switch completes.
    #[serde(default)]
    pub quit_on_complete: bool,

    /// Keep a login-time registration for this agent.
    #[serde(default)]
    pub run_on_startup: bool,

    /// When the record was last changed.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Owner of the preference record and its backing file.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferenceStore {
    /// Load preferences from the default location, falling back to
    /// defaults when no prior settings exist.
    pub fn load() -> Result<Self, PreferencesError> {
        Self::load_from(paths::preferences_file())
    }

    /// Load preferences from a specific path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();

        if !path.exists() {
            debug!(path = ?path, "No preferences file, using defaults");
            return Ok(Self {
                path,
                prefs: Preferences::default(),
            });
        }

        let content = std::fs::read_to_string(&path)?;
        let prefs: Preferences = serde_json::from_str(&content)?;
        Ok(Self { path, prefs })
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a newly applied device as the preferred one.
    pub fn set_preferred_device(&mut self, name: &str) -> Result<(), PreferencesError> {
        self.prefs.preferred_device = Some(name.to_string());
        self.persist()
    }

    pub fn toggle_change_on_run(&mut self) -> Result<bool, PreferencesError> {
        self.prefs.change_on_run = !self.prefs.change_on_run;
        self.persist()?;
        Ok(self.prefs.change_on_run)
    }

    pub fn toggle_quit_on_complete(&mut self) -> Result<bool, PreferencesError> {
        self.prefs.quit_on_complete = !self.prefs.quit_on_complete;
        self.persist()?;
        Ok(self.prefs.quit_on_complete)
    }

    pub fn toggle_run_on_startup(&mut self) -> Result<bool, PreferencesError> {
        self.prefs.run_on_startup = !self.prefs.run_on_startup;
        self.persist()?;
        Ok(self.prefs.run_on_startup)
    }

    /// Write the record to disk. The write is atomic from the caller's
    /// perspective: either the new record lands or the old file stays.
    fn persist(&mut self) -> Result<(), PreferencesError> {
        self.prefs.updated_at = Some(Utc::now());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.prefs)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = ?self.path, "Preferences saved");
        Ok(())
    }
}
