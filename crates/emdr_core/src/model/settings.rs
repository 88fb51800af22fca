//! Animation settings model.
//!
//! # Responsibility
//! - Hold the dot animation parameters and their documented bounds.
//! - Clamp numeric input and validate color literals.
//!
//! # Invariants
//! - `gap` stays in `[GAP_MIN, GAP_MAX]`.
//! - `amplitude` stays in `[AMPLITUDE_MIN, AMPLITUDE_MAX]`.
//! - `speed` stays finite and in `[SPEED_MIN, SPEED_MAX]`.
//! - `dot_color` is always a `#rgb` or `#rrggbb` literal.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const GAP_MIN: i64 = 10;
pub const GAP_MAX: i64 = 200;
pub const AMPLITUDE_MIN: i64 = 10;
pub const AMPLITUDE_MAX: i64 = 50;
pub const SPEED_MIN: f64 = 0.5;
pub const SPEED_MAX: f64 = 10.0;

pub const DEFAULT_GAP: i64 = 100;
pub const DEFAULT_AMPLITUDE: i64 = 30;
pub const DEFAULT_SPEED: f64 = 1.0;
pub const DEFAULT_DOT_COLOR: &str = "#3b82f6";

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex color regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    InvalidColor(String),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidColor(value) => {
                write!(f, "dot color `{value}` is not a #rgb or #rrggbb literal")
            }
        }
    }
}

impl Error for SettingsError {}

/// Validated dot color literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotColor(String);

impl DotColor {
    pub fn parse(value: &str) -> Result<Self, SettingsError> {
        let trimmed = value.trim();
        if HEX_COLOR_RE.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(SettingsError::InvalidColor(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DotColor {
    fn default() -> Self {
        Self(DEFAULT_DOT_COLOR.to_string())
    }
}

impl TryFrom<String> for DotColor {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DotColor> for String {
    fn from(value: DotColor) -> Self {
        value.0
    }
}

impl Display for DotColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Animation parameters bound to the dot view.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Horizontal spacing between dots in pixels.
    pub gap: i64,
    /// Oscillation magnitude in pixels.
    pub amplitude: i64,
    /// Oscillation cycles per second.
    pub speed: f64,
    pub dot_color: DotColor,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            amplitude: DEFAULT_AMPLITUDE,
            speed: DEFAULT_SPEED,
            dot_color: DotColor::default(),
        }
    }
}

impl Settings {
    /// Returns a copy with every numeric field forced into bounds.
    pub fn clamped(&self) -> Self {
        Self {
            gap: clamp_gap(self.gap),
            amplitude: clamp_amplitude(self.amplitude),
            speed: clamp_speed(self.speed).unwrap_or(DEFAULT_SPEED),
            dot_color: self.dot_color.clone(),
        }
    }
}

pub fn clamp_gap(value: i64) -> i64 {
    value.clamp(GAP_MIN, GAP_MAX)
}

pub fn clamp_amplitude(value: i64) -> i64 {
    value.clamp(AMPLITUDE_MIN, AMPLITUDE_MAX)
}

/// Clamps speed into bounds; returns `None` for NaN or infinite input.
pub fn clamp_speed(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value.clamp(SPEED_MIN, SPEED_MAX))
    } else {
        None
    }
}
