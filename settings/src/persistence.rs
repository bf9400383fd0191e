//! Settings persistence layer
//!
//! The on-disk format is newline-delimited `key=value` text. Values may
//! contain `=`; only the first one separates key from value. Lines without
//! a separator are skipped on load.

use crate::Settings;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during settings persistence
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(String),
}

/// Encodes settings into the `key=value` text form
pub fn encode(settings: &Settings) -> String {
    let mut text = String::new();
    for (key, value) in settings.iter() {
        text.push_str(key);
        text.push('=');
        text.push_str(value);
        text.push('\n');
    }
    text
}

/// Decodes `key=value` text, skipping lines without a separator
pub fn decode(text: &str) -> Settings {
    let mut settings = Settings::new();
    for line in text.lines() {
        if let Some((key, value)) = line.split_once('=') {
            settings.set(key, value);
        }
    }
    settings
}

/// Writes settings to `path`, replacing any previous file
pub fn save_settings(settings: &Settings, path: &Path) -> Result<(), SettingsError> {
    fs::write(path, encode(settings)).map_err(|e| SettingsError::Io(e.to_string()))
}

/// Loads settings from `path`
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let text = fs::read_to_string(path).map_err(|e| SettingsError::Io(e.to_string()))?;
    Ok(decode(&text))
}

/// Loads settings from `path`, falling back to empty settings if the file
/// is missing or unreadable
pub fn load_settings_safe(path: &Path) -> Settings {
    load_settings(path).unwrap_or_default()
}
