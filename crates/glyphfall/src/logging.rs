//! File logging; the terminal itself belongs to the animation.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "GLYPHFALL_LOG";

const LOG_FILE: &str = "glyphfall.log";

/// Install the global subscriber writing to the data directory.
///
/// Returns the log file path, or `None` when logging could not be set up.
pub fn init() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "glyphfall")?;
    let dir = dirs.data_dir();
    fs::create_dir_all(dir).ok()?;

    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .ok()?;

    Some(path)
}
