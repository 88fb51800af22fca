//! State store configuration.
//!
//! Defaults match the records written by the browser build, so a store
//! constructed with `StoreConfig::default()` reads existing user data.

use serde::Deserialize;
use std::time::Duration;

pub const STATE_KEY: &str = "emdr-app-state";
pub const LEGACY_NOTES_KEY: &str = "emdr-notes";
pub const SAVE_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Key of the full `AppState` record.
    pub state_key: String,
    /// Key of the notes-only record written by older builds.
    pub legacy_notes_key: String,
    /// Quiet window before a pending save is written.
    pub save_debounce_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            state_key: STATE_KEY.to_string(),
            legacy_notes_key: LEGACY_NOTES_KEY.to_string(),
            save_debounce_ms: SAVE_DEBOUNCE_MS,
        }
    }
}

impl StoreConfig {
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}
