//! Damage pipeline configuration loader.

use std::path::Path;

use damage_core::DamageConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`DamageConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<DamageConfig> {
        let content = read_file(path)?;
        Self::from_toml(&content)
    }

    /// Parse config data from TOML text. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> LoadResult<DamageConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}
