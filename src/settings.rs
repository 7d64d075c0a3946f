//! Display preferences persisted between sessions as a small JSON file.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_SETTINGS_FILE: &str = "chess-settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings i/o on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed settings in {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl FromStr for AnimationSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slow" => Ok(AnimationSpeed::Slow),
            "normal" => Ok(AnimationSpeed::Normal),
            "fast" => Ok(AnimationSpeed::Fast),
            _ => Err(format!("unknown animation speed `{s}`; use slow, normal or fast")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub sound_enabled: bool,
    pub show_coordinates: bool,
    pub animation_speed: AnimationSpeed,
    pub highlight_moves: bool,
    pub confirm_moves: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: false,
            show_coordinates: true,
            animation_speed: AnimationSpeed::Normal,
            highlight_moves: true,
            confirm_moves: false,
        }
    }
}

impl Settings {
    /// Reads `path`; a missing file yields the defaults. Unknown keys are
    /// ignored and missing keys take their default.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(SettingsError::Io { path: path.to_path_buf(), source }),
        };
        serde_json::from_str(&text).map_err(|source| SettingsError::Parse { path: path.to_path_buf(), source })
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source: io::Error| SettingsError::Io { path: path.to_path_buf(), source };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse { path: path.to_path_buf(), source })?;
        fs::write(path, json).map_err(io_err)?;
        debug!("settings saved to {}", path.display());
        Ok(())
    }

    pub fn reset(&mut self) { *self = Self::default(); }
}
