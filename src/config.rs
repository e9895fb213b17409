//! Configuration loading and management
//!
//! Handles parsing of `.taskboard.toml` and resolving the data directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::board::NotFoundPolicy;
use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::persist::DEFAULT_SLOT;

/// Name of the configuration file looked up inside the data directory
pub const CONFIG_FILE: &str = ".taskboard.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Slot storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Board behaviour
    #[serde(default)]
    pub board: BoardConfig,
}

/// Slot storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding slot files
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Slot name holding the board
    #[serde(default = "default_slot")]
    pub slot: String,

    /// How long to wait for the slot lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_slot() -> String {
    DEFAULT_SLOT.to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            slot: default_slot(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Board behaviour configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// Reject operations on unknown task/column ids instead of ignoring them
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            strict: default_strict(),
        }
    }
}

impl BoardConfig {
    pub fn policy(&self) -> NotFoundPolicy {
        NotFoundPolicy::from_strict(self.strict)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.taskboard.toml` from `dir`, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        self.storage.validate()
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        let slot = self.slot.trim();
        if slot.is_empty() {
            return Err(Error::InvalidConfig(
                "storage.slot cannot be empty".to_string(),
            ));
        }
        if !slot
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
        {
            return Err(Error::InvalidConfig(format!(
                "storage.slot '{slot}' may only contain letters, digits, '_', '-' and '.'"
            )));
        }
        if self.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Platform data directory for taskboard (e.g. `~/.local/share/taskboard`)
pub fn default_data_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("", "", "taskboard")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            Error::OperationFailed("could not determine a data directory".to_string())
        })
}

/// Resolve the data directory: explicit flag/env first, then config, then platform default.
pub fn resolve_data_dir(explicit: Option<&Path>, config: &Config) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = config.storage.dir.as_deref() {
        return Ok(dir.to_path_buf());
    }
    default_data_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_slot() {
        let config = Config::default();
        assert_eq!(config.storage.slot, "taskColumns");
        assert_eq!(config.storage.lock_timeout_ms, DEFAULT_LOCK_TIMEOUT_MS);
        assert!(config.board.strict);
        assert_eq!(config.board.policy(), NotFoundPolicy::Strict);
    }

    #[test]
    fn slot_names_are_restricted() {
        let mut storage = StorageConfig::default();
        storage.slot = "../escape".to_string();
        assert!(storage.validate().is_err());

        storage.slot = "board-v2.main".to_string();
        assert!(storage.validate().is_ok());
    }

    #[test]
    fn explicit_dir_wins_over_config() {
        let mut config = Config::default();
        config.storage.dir = Some(PathBuf::from("/from/config"));

        let resolved = resolve_data_dir(Some(Path::new("/from/flag")), &config).unwrap();
        assert_eq!(resolved, PathBuf::from("/from/flag"));

        let resolved = resolve_data_dir(None, &config).unwrap();
        assert_eq!(resolved, PathBuf::from("/from/config"));
    }
}
