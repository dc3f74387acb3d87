//! Durable user preferences.
//!
//! Only the text-size scale lives here. It is kept apart from `config.toml`
//! because the application writes it, while the config file is edited by
//! hand.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;

const MIN_TENTHS: u8 = 8;
const MAX_TENTHS: u8 = 14;
const DEFAULT_TENTHS: u8 = 10;

/// Text-size multiplier in `[0.8, 1.4]`, in steps of 0.1.
///
/// Held as tenths so that stepping never accumulates float error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct TextScale(u8);

impl TextScale {
    pub const MIN: TextScale = TextScale(MIN_TENTHS);
    pub const MAX: TextScale = TextScale(MAX_TENTHS);

    pub fn value(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    pub fn step_up(self) -> Self {
        TextScale((self.0 + 1).min(MAX_TENTHS))
    }

    pub fn step_down(self) -> Self {
        TextScale(self.0.saturating_sub(1).max(MIN_TENTHS))
    }

    /// Side margin for the detail pane; larger text gets more width.
    pub fn detail_margin(self) -> u16 {
        u16::from(MAX_TENTHS - self.0)
    }
}

impl Default for TextScale {
    fn default() -> Self {
        TextScale(DEFAULT_TENTHS)
    }
}

impl From<f64> for TextScale {
    /// Clamps to the valid range and snaps to the nearest step.
    fn from(value: f64) -> Self {
        if !value.is_finite() {
            return TextScale::default();
        }
        let tenths = (value * 10.0).round();
        let tenths = tenths.clamp(f64::from(MIN_TENTHS), f64::from(MAX_TENTHS));
        TextScale(tenths as u8)
    }
}

impl From<TextScale> for f64 {
    fn from(scale: TextScale) -> Self {
        scale.value()
    }
}

impl fmt::Display for TextScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x", self.value())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub text_scale: TextScale,
}

impl Preferences {
    /// `<data dir>/newsum/preferences.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        Ok(data_dir.join("newsum").join("preferences.toml"))
    }

    /// Missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string(self).map_err(|e| ConfigError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;

        fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), text_scale = %self.text_scale, "Preferences saved");
        Ok(())
    }
}
