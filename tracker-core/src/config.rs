//! Tracker configuration loading
//!
//! Loads configuration from `~/.config/project-tracker/tracker.toml`
//! (or the `TRACKER_CONFIG` env var). A missing file means defaults.
//!
//! ```toml
//! data_file = "/srv/tracker/projects.csv"
//! due_soon_days = 3
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::ConfigError;
use crate::query::DEFAULT_DUE_SOON_DAYS;

/// Root configuration for the tracker.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// Path of the project table (relative paths resolve against the cwd)
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Deadlines this many days out (inclusive) are flagged as due soon
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: u32,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("projects.xlsx")
}

fn default_due_soon_days() -> u32 {
    DEFAULT_DUE_SOON_DAYS
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            due_soon_days: default_due_soon_days(),
        }
    }
}

impl TrackerConfig {
    /// Environment variable for a custom config path
    pub const ENV_CONFIG_PATH: &'static str = "TRACKER_CONFIG";

    /// Environment variable overriding `data_file`
    pub const ENV_DATA_FILE: &'static str = "TRACKER_DATA_FILE";

    pub const DEFAULT_CONFIG_FILENAME: &'static str = "tracker.toml";

    const MAX_DUE_SOON_DAYS: u32 = 365;

    /// Load configuration from the default location, or `explicit` when given.
    ///
    /// An explicit path must exist; the default location may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let path = Self::resolve_config_path();
        if !path.exists() {
            tracing::debug!(
                path = %path.display(),
                "tracker config not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from TOML string
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let cfg: TrackerConfig = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// The table path: CLI override, then `TRACKER_DATA_FILE`, then config.
    pub fn resolve_data_file(&self, cli_override: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_override {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var(Self::ENV_DATA_FILE)
            && !path.trim().is_empty()
        {
            return PathBuf::from(path);
        }
        self.data_file.clone()
    }

    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|d| d.join("project-tracker").join(Self::DEFAULT_CONFIG_FILENAME))
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_file must not be empty".to_string()));
        }
        if self.due_soon_days > Self::MAX_DUE_SOON_DAYS {
            return Err(ConfigError::Invalid(format!(
                "due_soon_days must be at most {}, got {}",
                Self::MAX_DUE_SOON_DAYS,
                self.due_soon_days
            )));
        }
        Ok(())
    }
}
