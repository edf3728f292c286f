//! Config loader facade: single entry for loading and validating configuration.

use super::merge::merge_policy;
use super::sources::{environment, explicit_file, global_file};
use super::EngineConfig;
use crate::error::ConfigError;
use std::path::Path;
use tracing::debug;

/// Configuration loader
///
/// Precedence (highest to lowest):
/// 1. `ARBOR__*` environment variables
/// 2. Explicit config file
/// 3. Global config file
/// 4. Built-in defaults
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources.
    pub fn load() -> Result<EngineConfig, ConfigError> {
        Self::load_with(None, true)
    }

    /// Load configuration, layering `path` above the global file.
    pub fn load_from(path: &Path) -> Result<EngineConfig, ConfigError> {
        Self::load_with(Some(path), true)
    }

    /// Load configuration without the global file, for reproducible runs.
    pub fn load_isolated(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
        Self::load_with(path, false)
    }

    fn load_with(explicit: Option<&Path>, use_global: bool) -> Result<EngineConfig, ConfigError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        if use_global {
            builder = global_file::add_to_builder(builder)?;
        }
        if let Some(path) = explicit {
            debug!(config_path = %path.display(), "Loading explicit configuration file");
            builder = explicit_file::add_to_builder(builder, path)?;
        }
        builder = environment::add_to_builder(builder);

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
