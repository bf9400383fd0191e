//! # Session Settings
//!
//! Persistent `key=value` settings for the shell session.
//!
//! ## Design
//!
//! - Settings are a flat string map with stable (sorted) ordering
//! - The on-disk form is newline-delimited `key=value` text; the format is
//!   an external interface and stays hand-parsed rather than serialized
//! - Loading is forgiving: unparseable lines are skipped, a missing or
//!   broken file yields empty settings
//!
//! The only key the system itself recognizes is [`keys::LAST_DIR`], which
//! restores the current working node at startup.

pub mod persistence;

use std::collections::BTreeMap;

pub use persistence::{load_settings, load_settings_safe, save_settings, SettingsError};

/// Well-known setting keys
pub mod keys {
    /// Absolute path of the working directory, restored at startup
    pub const LAST_DIR: &str = "LastDir";
}

/// Session settings map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: BTreeMap<String, String>,
}

impl Settings {
    /// Creates empty settings
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Returns a setting value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Sets a setting value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Removes a setting, returning its previous value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Number of stored settings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no settings are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the restored working directory, if recorded
    pub fn last_dir(&self) -> Option<&str> {
        self.get(keys::LAST_DIR)
    }

    /// Records the working directory for the next session
    pub fn set_last_dir(&mut self, path: impl Into<String>) {
        self.set(keys::LAST_DIR, path);
    }

    /// Iterates entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
