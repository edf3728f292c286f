//! Configuration System
//!
//! Engine defaults, cache switch and logging settings. Layered from built-in
//! defaults, the user config file, an explicit file, and `ARBOR__*`
//! environment variables, then validated before use.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::tree::resolver::NodeDefaults;
use crate::types::{Permissions, Timestamp, MAX_PERMISSIONS};
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Permissions of files created without an explicit value
    #[serde(default = "default_file_permissions")]
    pub default_file_permissions: Permissions,

    /// Permissions of directories created implicitly or without an explicit value
    #[serde(default = "default_dir_permissions")]
    pub default_dir_permissions: Permissions,

    /// Modification time given to newly created nodes
    #[serde(default)]
    pub default_timestamp: Timestamp,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Operation cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Memoize mutation and diff results (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_file_permissions() -> Permissions {
    0o644
}

fn default_dir_permissions() -> Permissions {
    0o755
}

fn default_true() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_file_permissions: default_file_permissions(),
            default_dir_permissions: default_dir_permissions(),
            default_timestamp: 0,
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("default_file_permissions", self.default_file_permissions),
            ("default_dir_permissions", self.default_dir_permissions),
        ] {
            if value > MAX_PERMISSIONS {
                errors.push(format!("{} {:#o} exceeds {:#o}", field, value, MAX_PERMISSIONS));
            }
        }
        if let Err(e) = self.logging.validate() {
            errors.push(format!("logging: {}", e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }

    /// Defaults applied to directories created along a write path.
    pub fn node_defaults(&self) -> NodeDefaults {
        NodeDefaults {
            dir_permissions: self.default_dir_permissions,
            mtime: self.default_timestamp,
        }
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
