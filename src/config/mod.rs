//! Configuration management for newsum.
//!
//! Configuration is read from `~/.config/newsum/config.toml` at startup
//! (or from `--config`). If the file doesn't exist, a default configuration
//! with comments is created.

pub mod colors;
pub mod preferences;

pub use colors::ColorConfig;
pub use preferences::{Preferences, TextScale};

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::orchestrator::{BusyPolicy, RefreshPolicy};

/// Fallback for builds that don't set `NEWSUM_API_BASE`.
const FALLBACK_BASE_URL: &str = "http://localhost:8000/api";

/// Base URL baked in at compile time.
pub fn default_base_url() -> &'static str {
    option_env!("NEWSUM_API_BASE").unwrap_or(FALLBACK_BASE_URL)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub refresh: RefreshConfig,
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url().to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub debounce_ms: u64,
    pub deadline_secs: u64,
    pub clear_on_error: bool,
    pub keep_on_empty: bool,
    pub on_busy: BusyPolicy,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        let policy = RefreshPolicy::default();
        Self {
            debounce_ms: policy.debounce.as_millis() as u64,
            deadline_secs: policy.deadline.as_secs(),
            clear_on_error: policy.clear_on_error,
            keep_on_empty: policy.keep_on_empty,
            on_busy: policy.on_busy,
        }
    }
}

impl From<&RefreshConfig> for RefreshPolicy {
    fn from(config: &RefreshConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            deadline: Duration::from_secs(config.deadline_secs.max(1)),
            clear_on_error: config.clear_on_error,
            keep_on_empty: config.keep_on_empty,
            on_busy: config.on_busy,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// A missing file at the default path is created with commented
    /// defaults; a missing explicit path is an error. Missing fields use
    /// default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    tracing::info!(path = %default_path.display(), "Created default config");
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// `~/.config/newsum/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("newsum").join("config.toml"))
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::from(&self.refresh)
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        format!(
            r##"# newsum configuration
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"

[api]
# Root of the summary API; "summary/headlines" is resolved against it
base_url = "{base_url}"

# Connection setup timeout in seconds. The overall limit for a refresh is
# [refresh] deadline_secs.
connect_timeout_secs = 10

[refresh]
# Quiet interval before a debounced refresh fires (milliseconds)
debounce_ms = 500

# Overall limit for a refresh with a deadline (seconds)
deadline_secs = 10

# Drop the current headlines when a refresh fails
clear_on_error = false

# Keep the current headlines when the server returns none
keep_on_empty = false

# What a refresh does while another is running: "coalesce" or "supersede"
on_busy = "coalesce"

[colors]
active_border = "Cyan"
inactive_border = "DarkGray"
selection_bg = "Cyan"
selection_fg = "Black"
headline = "White"
source = "Yellow"
date = "DarkGray"
link = "Blue"
error_fg = "White"
error_bg = "Red"
status_fg = "White"
status_bg = "DarkGray"
"##,
            base_url = default_base_url()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read/write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: toml::ser::Error,
    },
}
