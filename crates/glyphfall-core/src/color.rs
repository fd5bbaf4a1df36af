//! Color values and CSS-style color parsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An sRGB color with a straight (non-premultiplied) alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `0.0..=1.0`.
    pub a: f32,
}

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("empty color string")]
    Empty,
    #[error("invalid hex color `{0}`")]
    Hex(String),
    #[error("invalid color function `{0}`")]
    Function(String),
    #[error("unsupported color `{0}`")]
    Unsupported(String),
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    /// Opaque color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Same color with a different opacity.
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Linear interpolation between two colors, `t` clamped to `0.0..=1.0`.
    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Channels as floats in `0.0..=255.0`.
    pub fn channels(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ColorParseError::Empty);
        }

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorParseError::Hex(s.to_string()));
        }

        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            let has_alpha = lower.starts_with("rgba(");
            return args
                .strip_suffix(')')
                .and_then(|args| parse_function_args(args, has_alpha))
                .ok_or_else(|| ColorParseError::Function(s.to_string()));
        }

        match lower.as_str() {
            "white" => Ok(Rgba::WHITE),
            "black" => Ok(Rgba::BLACK),
            "red" => Ok(Rgba::rgb(255, 0, 0)),
            "lime" => Ok(Rgba::rgb(0, 255, 0)),
            "green" => Ok(Rgba::rgb(0, 128, 0)),
            "blue" => Ok(Rgba::rgb(0, 0, 255)),
            "transparent" => Ok(Rgba::BLACK.with_alpha(0.0)),
            _ => Err(ColorParseError::Unsupported(s.to_string())),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        _ => None,
    }
}

fn parse_function_args(args: &str, has_alpha: bool) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if has_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let v: f32 = s.parse().ok()?;
        v.is_finite().then(|| v.clamp(0.0, 255.0).round() as u8)
    };

    let mut color = Rgba::rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?);
    if has_alpha {
        let a: f32 = parts[3].parse().ok()?;
        if !a.is_finite() {
            return None;
        }
        color = color.with_alpha(a);
    }
    Some(color)
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}
