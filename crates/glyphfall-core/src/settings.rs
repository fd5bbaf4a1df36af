//! Settings types shared between configuration and animations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest heart particle pool accepted from configuration.
pub const MAX_HEART_PARTICLES: usize = 100_000;

/// The greeting sequence shown before the heart.
pub const DEFAULT_MESSAGES: [&str; 8] = [
    "3",
    "2",
    "1",
    "Happy birthday",
    "25.06.2003",
    "Nguyễn Bảo Hân",
    "Chúc em sinh nhật vui vẻ",
    "Có tất cả trừ vất vả",
];

/// Tuning for the heart particle finale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartSettings {
    /// Pool capacity.
    pub length: usize,
    /// Particle lifetime in seconds.
    pub duration: f32,
    /// Initial outward speed in logical pixels per second.
    pub velocity: f32,
    /// Acceleration factor applied to the outward direction.
    pub effect: f32,
    /// Maximum sprite size in logical pixels.
    pub size: f32,
}

impl Default for HeartSettings {
    fn default() -> Self {
        Self {
            length: 2000,
            duration: 2.0,
            velocity: 100.0,
            effect: -1.3,
            size: 13.0,
        }
    }
}

/// Heart settings that cannot drive the particle field.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum HeartSettingsError {
    #[error("heart length must be between 1 and {MAX_HEART_PARTICLES}, got {0}")]
    Length(usize),
    #[error("heart duration must be a positive number of seconds, got {0}")]
    Duration(f32),
    #[error("heart {0} must be finite")]
    NotFinite(&'static str),
    #[error("heart size must not be negative, got {0}")]
    Size(f32),
}

impl HeartSettings {
    /// Check that the settings describe a bounded, finite simulation.
    pub fn validate(&self) -> Result<(), HeartSettingsError> {
        if !(1..=MAX_HEART_PARTICLES).contains(&self.length) {
            return Err(HeartSettingsError::Length(self.length));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(HeartSettingsError::Duration(self.duration));
        }
        for (name, value) in [
            ("velocity", self.velocity),
            ("effect", self.effect),
            ("size", self.size),
        ] {
            if !value.is_finite() {
                return Err(HeartSettingsError::NotFinite(name));
            }
        }
        if self.size < 0.0 {
            return Err(HeartSettingsError::Size(self.size));
        }
        Ok(())
    }

    /// Particles emitted per second.
    pub fn spawn_rate(&self) -> f32 {
        if self.duration > 0.0 {
            self.length as f32 / self.duration
        } else {
            0.0
        }
    }
}

/// Which glyphs the rain draws from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharSet {
    /// Katakana followed by hiragana.
    #[default]
    Default,
    /// Digits, box-drawing symbols and a katakana subset.
    Custom,
    /// Exactly the characters of the given string.
    Literal(String),
}
