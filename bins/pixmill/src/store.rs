//! Persisted defaults for the CLI
//!
//! A small JSON file under the user config directory remembers the last
//! output folder and the preferred quality and format between runs. Loading
//! falls back to defaults on any problem and saving is best-effort; neither
//! ever interrupts a run. `PIXMILL_CONFIG_DIR` relocates the file, for
//! sandboxed runs and tests.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use pixmill_engine::{DEFAULT_QUALITY, OutputFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Defaults carried from one run to the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredDefaults {
    /// Output folder of the previous run, used when `--output` is omitted.
    pub last_output_folder: Option<PathBuf>,
    /// Quality used when `--quality` is omitted.
    pub default_quality: u8,
    /// Format used when `--format` is omitted.
    pub default_format: OutputFormat,
}

impl Default for StoredDefaults {
    fn default() -> Self {
        Self {
            last_output_folder: None,
            default_quality: DEFAULT_QUALITY,
            default_format: OutputFormat::Webp,
        }
    }
}

fn settings_path() -> Option<PathBuf> {
    if let Some(dir) = env::var_os("PIXMILL_CONFIG_DIR").filter(|dir| !dir.is_empty()) {
        return Some(PathBuf::from(dir).join("settings.json"));
    }
    dirs::config_dir().map(|dir| dir.join("pixmill").join("settings.json"))
}

/// Load stored defaults, or the built-in ones when the file is absent or
/// unreadable.
pub fn load() -> StoredDefaults {
    match settings_path() {
        Some(path) => load_from(&path),
        None => StoredDefaults::default(),
    }
}

fn load_from(path: &Path) -> StoredDefaults {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "no stored settings");
            return StoredDefaults::default();
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(defaults) => defaults,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "ignoring unreadable settings");
            StoredDefaults::default()
        }
    }
}

/// Persist defaults for the next run. Failures are logged and swallowed.
pub fn save(defaults: &StoredDefaults) {
    if let Some(path) = settings_path() {
        save_to(&path, defaults);
    }
}

fn save_to(path: &Path, defaults: &StoredDefaults) {
    let result = (|| -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(defaults).map_err(std::io::Error::other)?;
        fs::write(path, json)
    })();
    if let Err(err) = result {
        debug!(path = %path.display(), error = %err, "could not save settings");
    }
}
