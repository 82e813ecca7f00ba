//! Gesture tuning configuration.
//!
//! # Responsibility
//! - Hold every timing and distance constant used by gesture recognition.
//! - Load overrides from JSON with per-field defaults.
//!
//! # Invariants
//! - A config that passed `validate()` never yields zero delays, negative
//!   distances or a non-decaying inertia factor.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Timing and distance constants for drag and pan gestures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Long-press delay before a card drag starts.
    pub card_press_ms: u64,
    /// Long-press delay before a column drag starts.
    pub column_press_ms: u64,
    /// Per-axis movement that cancels a pending press.
    pub move_threshold_px: f64,
    /// Sustained hover before a card-over-card drop merges.
    pub merge_hold_ms: u64,
    /// Horizontal tolerance around card edges for nearest-card search.
    pub band_tolerance_px: f64,
    /// Horizontal margin around columns for column drop zones.
    pub column_drop_margin_px: f64,
    /// Pan acceleration applied to pointer delta.
    pub pan_factor: f64,
    /// Velocity multiplier applied on every inertia frame.
    pub inertia_decay: f64,
    /// Inertia stops once `|velocity|` drops to this value.
    pub inertia_min_velocity: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            card_press_ms: 200,
            column_press_ms: 400,
            move_threshold_px: 5.0,
            merge_hold_ms: 1500,
            band_tolerance_px: 50.0,
            column_drop_margin_px: 100.0,
            pan_factor: 2.0,
            inertia_decay: 0.95,
            inertia_min_velocity: 0.5,
        }
    }
}

/// Errors from config loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io(std::io::Error),
    /// JSON payload is malformed or has wrong field types.
    Parse(serde_json::Error),
    /// A field holds an unusable value.
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read canvas config: {err}"),
            Self::Parse(err) => write!(f, "invalid canvas config JSON: {err}"),
            Self::InvalidValue { field, reason } => {
                write!(f, "invalid canvas config `{field}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl CanvasConfig {
    /// Parses a JSON object; missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(raw.as_str())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.card_press_ms == 0 {
            return Err(invalid("card_press_ms", "must be greater than zero"));
        }
        if self.column_press_ms == 0 {
            return Err(invalid("column_press_ms", "must be greater than zero"));
        }
        if self.merge_hold_ms == 0 {
            return Err(invalid("merge_hold_ms", "must be greater than zero"));
        }
        for (field, value) in [
            ("move_threshold_px", self.move_threshold_px),
            ("band_tolerance_px", self.band_tolerance_px),
            ("column_drop_margin_px", self.column_drop_margin_px),
            ("inertia_min_velocity", self.inertia_min_velocity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be a finite non-negative number"));
            }
        }
        if !self.pan_factor.is_finite() || self.pan_factor <= 0.0 {
            return Err(invalid("pan_factor", "must be a finite positive number"));
        }
        if !(self.inertia_decay > 0.0 && self.inertia_decay < 1.0) {
            return Err(invalid("inertia_decay", "must be within (0, 1)"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue { field, reason }
}
