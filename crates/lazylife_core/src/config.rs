//! Application configuration loaded from a JSON file.
//!
//! # Responsibility
//! - Describe where the database and logs live and which owner is signed in.
//! - Fill defaults for omitted keys and validate the rest.
//!
//! # Invariants
//! - A loaded `AppConfig` always has a usable log level.
//! - `owner_id`, when present, is non-blank.

use crate::logging::default_log_level;
use crate::model::record::OwnerId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DB_FILE: &str = "lazylife.sqlite3";
const SUPPORTED_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Runtime settings for the core and its front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_level")]
    pub log_level: String,
    /// File logging stays off when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub owner_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_level(),
            log_dir: None,
            owner_id: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    InvalidLogLevel(String),
    BlankOwnerId,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::InvalidLogLevel(level) => write!(f, "unsupported log_level `{level}`"),
            Self::BlankOwnerId => write!(f, "owner_id cannot be blank"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidLogLevel(_) | Self::BlankOwnerId => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl AppConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(raw)?;
        config.log_level = config.log_level.trim().to_ascii_lowercase();
        if !SUPPORTED_LEVELS.contains(&config.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.log_level));
        }
        if config
            .owner_id
            .as_deref()
            .is_some_and(|owner| owner.trim().is_empty())
        {
            return Err(ConfigError::BlankOwnerId);
        }
        Ok(config)
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_json_str(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Configured owner, if any.
    pub fn owner(&self) -> Option<OwnerId> {
        self.owner_id
            .as_deref()
            .and_then(|owner| OwnerId::parse(owner).ok())
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILE)
}

fn default_level() -> String {
    default_log_level().to_string()
}
