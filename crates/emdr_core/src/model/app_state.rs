//! Persisted aggregate of settings and notes.
//!
//! # Responsibility
//! - Define the JSON shape stored under the primary state key.
//! - Convert between the wire shape and in-memory `Settings` + notes.
//!
//! # Invariants
//! - Field names match the browser record (`dotColor` is camelCase).
//! - Missing fields deserialize to defaults; wrongly typed fields fail.
//! - `gap`/`amplitude` accept any JSON number and are rounded to integers.

use crate::model::note::Note;
use crate::model::settings::{
    DotColor, Settings, SettingsError, DEFAULT_AMPLITUDE, DEFAULT_DOT_COLOR, DEFAULT_GAP,
    DEFAULT_SPEED,
};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Wire shape of the `emdr-app-state` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    #[serde(deserialize_with = "rounded_integer")]
    pub gap: i64,
    #[serde(deserialize_with = "rounded_integer")]
    pub amplitude: i64,
    pub speed: f64,
    /// Kept as raw text so an invalid stored color degrades to the default
    /// instead of discarding the whole record.
    pub dot_color: String,
    /// Newest first.
    pub notes: Vec<Note>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            amplitude: DEFAULT_AMPLITUDE,
            speed: DEFAULT_SPEED,
            dot_color: DEFAULT_DOT_COLOR.to_string(),
            notes: Vec::new(),
        }
    }
}

impl AppState {
    /// Captures a snapshot of in-memory state.
    pub fn capture(settings: &Settings, notes: &[Note]) -> Self {
        Self {
            gap: settings.gap,
            amplitude: settings.amplitude,
            speed: settings.speed,
            dot_color: settings.dot_color.as_str().to_string(),
            notes: notes.to_vec(),
        }
    }

    /// Splits the record into clamped settings and notes.
    ///
    /// Returns the color error alongside when the stored color was replaced
    /// by the default.
    pub fn into_parts(self) -> (Settings, Vec<Note>, Option<SettingsError>) {
        let (dot_color, color_error) = match DotColor::parse(&self.dot_color) {
            Ok(color) => (color, None),
            Err(err) => (DotColor::default(), Some(err)),
        };
        let settings = Settings {
            gap: self.gap,
            amplitude: self.amplitude,
            speed: self.speed,
            dot_color,
        }
        .clamped();
        (settings, self.notes, color_error)
    }
}

/// Decodes any JSON number, rounding fractional values to the nearest
/// integer. Out-of-range magnitudes saturate and are clamped later.
fn rounded_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(D::Error::custom("expected a finite number"));
    }
    Ok(value.round() as i64)
}
