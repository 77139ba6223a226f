//! Configuration loading and root folder resolution
//!
//! The root folder resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `GYM_ROOT_FOLDER` environment variable
//! 3. `root_folder` key of the TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! Everything else under the root is derived by [`StorageLayout`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "GYM_ROOT_FOLDER";

/// Folder holding the date-partitioned member documents
pub const RECORDS_DIR_NAME: &str = "Gym Data";

/// Folder holding member photos keyed by id
pub const PHOTOS_DIR_NAME: &str = "Member Photos";

/// SQLite file holding the attendance and fee ledgers
pub const DATABASE_FILE_NAME: &str = "gym_users.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymConfig {
    /// Root folder for all gym data (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Name printed in every document header
    #[serde(default = "default_gym_name")]
    pub gym_name: String,

    /// Name printed in every document footer
    #[serde(default = "default_creator")]
    pub creator: String,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_gym_name() -> String {
    "SOLID GYM".to_string()
}

fn default_creator() -> String {
    "Admin".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for GymConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            gym_name: default_gym_name(),
            creator: default_creator(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GymConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the config file if present; a missing or corrupt file falls back
    /// to defaults with a warning instead of failing startup.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring unreadable config file: {}", e);
                Self::default()
            }
        }
    }

    /// Write the config as TOML, creating the parent folder
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Per-user config file location (`<config_dir>/gym-records/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gym-records").join("config.toml"))
}

/// Resolve the root folder from CLI argument, environment, config, default.
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &GymConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("gym-records"))
        .unwrap_or_else(|| PathBuf::from("./gym_data"))
}

/// Folder layout derived from the root folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub root: PathBuf,
    pub records_dir: PathBuf,
    pub photos_dir: PathBuf,
    pub database_path: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            records_dir: root.join(RECORDS_DIR_NAME),
            photos_dir: root.join(PHOTOS_DIR_NAME),
            database_path: root.join(DATABASE_FILE_NAME),
            root,
        }
    }

    /// Create the records and photos folders if they do not exist
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.records_dir, &self.photos_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                warn!("Cannot create {}: {}", dir.display(), e);
                Error::StorageUnavailable(dir.clone())
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_derives_folders_from_root() {
        let layout = StorageLayout::new("/srv/gym");
        assert_eq!(layout.records_dir, PathBuf::from("/srv/gym/Gym Data"));
        assert_eq!(layout.photos_dir, PathBuf::from("/srv/gym/Member Photos"));
        assert_eq!(layout.database_path, PathBuf::from("/srv/gym/gym_users.db"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GymConfig = toml::from_str("root_folder = \"/data/gym\"").unwrap();
        assert_eq!(config.root_folder, Some(PathBuf::from("/data/gym")));
        assert_eq!(config.gym_name, "SOLID GYM");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_cli_argument_wins() {
        let config = GymConfig {
            root_folder: Some(PathBuf::from("/from/config")),
            ..Default::default()
        };
        let root = resolve_root_folder(Some(Path::new("/from/cli")), &config);
        assert_eq!(root, PathBuf::from("/from/cli"));
    }
}
