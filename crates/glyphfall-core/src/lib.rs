//! Core types for the glyphfall animation.
//!
//! Holds the pieces every other crate agrees on: colors, the drawing
//! [`Surface`] contract with its terminal [`Canvas`] implementation, and the
//! settings types that flow from configuration into the animations.

mod canvas;
mod color;
mod settings;
mod surface;

pub use canvas::Canvas;
pub use color::{ColorParseError, Rgba};
pub use settings::{
    CharSet, DEFAULT_MESSAGES, HeartSettings, HeartSettingsError, MAX_HEART_PARTICLES,
};
pub use surface::{RunFlag, Sprite, Surface};
