//! Configuration for glyphfall.
//!
//! Settings live in `config.toml` under the platform config directory. Every
//! field is optional; a missing file means all defaults.

use std::path::{Path, PathBuf};
use std::{fs, io};

use directories::ProjectDirs;
use glyphfall_core::{CharSet, DEFAULT_MESSAGES, HeartSettings, Rgba};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE: &str = "config.toml";

/// Failure to read or parse the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// User-facing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rain glyph set.
    pub chars: CharSet,
    /// Rain row height in logical pixels.
    pub font_size: f32,
    /// Rain font family. Rain glyphs are drawn with the terminal's own font.
    pub font: String,
    /// Font family list for messages and the caption; `monospace` selects
    /// the fixed-pitch layout, anything else the proportional one.
    pub message_font: String,
    /// Fixed logical width instead of the terminal's.
    pub width: Option<f32>,
    /// Fixed logical height instead of the terminal's.
    pub height: Option<f32>,
    /// Follow terminal resizes.
    pub auto_resize: bool,
    /// Rain color, used when no gradient is set.
    pub color: Rgba,
    /// Left and right rain gradient stops; empty for a solid color.
    pub gradient: Vec<Rgba>,
    /// Fade color applied every frame.
    pub background: Rgba,
    /// Quit on `q` or `Esc`.
    pub exit_on_key: bool,
    pub messages: Vec<String>,
    /// Milliseconds each message stays before morphing.
    pub dwell_ms: u64,
    /// Morph progress per frame.
    pub morph_step: f32,
    /// Images falling during the heart finale.
    pub images: Vec<PathBuf>,
    /// Text in the middle of the heart.
    pub caption: Option<String>,
    pub heart: HeartSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chars: CharSet::default(),
            font_size: 14.0,
            font: "monospace".to_string(),
            message_font: "Arial, Roboto, sans-serif".to_string(),
            width: None,
            height: None,
            auto_resize: true,
            color: Rgba::rgb(0, 255, 0),
            gradient: vec![Rgba::rgb(0xd2, 0x91, 0xff), Rgba::rgb(0xff, 0x8a, 0xe2)],
            background: Rgba::BLACK.with_alpha(0.05),
            exit_on_key: true,
            messages: DEFAULT_MESSAGES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            dwell_ms: 2000,
            morph_step: 0.04,
            images: vec![PathBuf::from("a1.jfif"), PathBuf::from("a2.jfif")],
            caption: Some("Bảo Hân".to_string()),
            heart: HeartSettings::default(),
        }
    }
}

impl Config {
    /// Platform config file location, if a home directory is known.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "glyphfall").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load from the platform config file, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Two gradient stops, when configured.
    pub fn gradient_stops(&self) -> Option<(Rgba, Rgba)> {
        match self.gradient.as_slice() {
            [from, to, ..] => Some((*from, *to)),
            _ => None,
        }
    }
}
