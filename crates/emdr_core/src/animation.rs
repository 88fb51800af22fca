//! CSS custom properties derived from animation settings.
//!
//! The page keyframes read `--dot-gap`, `--dot-amplitude`, `--dot-duration`
//! and `--dot-color`; this module is the only place those values are built.

use crate::model::settings::Settings;

/// Resolved animation values for one render of the dots view.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationStyle {
    pub gap_px: i64,
    pub amplitude_px: i64,
    /// One full oscillation, `1 / speed` seconds.
    pub duration_s: f64,
    pub color: String,
}

impl AnimationStyle {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            gap_px: settings.gap,
            amplitude_px: settings.amplitude,
            duration_s: 1.0 / settings.speed,
            color: settings.dot_color.as_str().to_string(),
        }
    }

    /// Declarations as `(name, value)` pairs, in stable order.
    pub fn css_vars(&self) -> [(&'static str, String); 4] {
        [
            ("--dot-gap", format!("{}px", self.gap_px)),
            ("--dot-amplitude", format!("{}px", self.amplitude_px)),
            ("--dot-duration", format!("{:.3}s", self.duration_s)),
            ("--dot-color", self.color.clone()),
        ]
    }

    /// Inline style text, e.g. for an element `style` attribute.
    pub fn to_css_vars(&self) -> String {
        self.css_vars()
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
