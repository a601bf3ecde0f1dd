//! Tracker settings loading from config.toml
//!
//! The `[tracker]` table controls the timezone used to resolve "today" and "yesterday",
//! the words that mean "no comment", and how many object buttons a selection keyboard
//! may hold. A missing file is not an error: every field has a default.

use crate::errors::{Error, Result};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::Deserialize;
use std::path::Path;

/// Discord allows 25 buttons per message; the object keyboard also carries "manual entry"
/// and "cancel".
pub const MAX_OBJECT_BUTTONS: usize = 23;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Settings {
    /// Tracker behaviour settings
    #[serde(default)]
    pub tracker: TrackerSettings,
}

/// Settings consumed by the dialogs and the reporting engine
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TrackerSettings {
    /// Offset of the configured timezone from UTC, in minutes (Europe/Moscow is 180)
    pub utc_offset_minutes: i32,
    /// Case-insensitive answers that mean "no comment"
    pub comment_skip_words: Vec<String>,
    /// Maximum number of object buttons offered in a selection keyboard
    pub max_object_buttons: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 180,
            comment_skip_words: ["нет", "no", "пропустить", "skip"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_object_buttons: 20,
        }
    }
}

impl TrackerSettings {
    /// The configured timezone as a fixed offset. Out-of-range values fall back to UTC.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }

    /// Today's calendar date in the configured timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset()).date_naive()
    }

    /// Whether `answer` is one of the configured skip words (or blank).
    #[must_use]
    pub fn is_skip_word(&self, answer: &str) -> bool {
        let answer = answer.trim().to_lowercase();
        answer.is_empty() || self.comment_skip_words.iter().any(|w| w.to_lowercase() == answer)
    }

    fn validate(&self) -> Result<()> {
        if FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).is_none() {
            return Err(Error::Config {
                message: format!(
                    "utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ),
            });
        }
        if !(1..=MAX_OBJECT_BUTTONS).contains(&self.max_object_buttons) {
            return Err(Error::Config {
                message: format!(
                    "max_object_buttons must be between 1 and {MAX_OBJECT_BUTTONS}, got {}",
                    self.max_object_buttons
                ),
            });
        }
        Ok(())
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    settings.tracker.validate()?;
    Ok(settings)
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid
/// - A value is out of range
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!("No settings file at {}, using defaults", path.display());
        return Ok(Settings::default());
    }
    tracing::debug!("Loading settings from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_settings(&contents)
}

/// Loads settings from the default location (./config.toml)
pub fn load_default_settings() -> Result<Settings> {
    load_settings("config.toml")
}
