//! Content factory for loading damage content from a data directory.

use std::path::{Path, PathBuf};

use damage_core::{DamageConfig, PrototypeSet};

use crate::loaders::{ConfigLoader, LoadResult, PrototypeLoader, Tunables, TunablesLoader};

/// Content factory that loads all damage content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── tunables.toml
/// ├── damage_types.ron
/// ├── damage_groups.ron
/// ├── damage_containers.ron
/// └── modifier_sets.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load pipeline configuration from `config.toml`, or defaults if absent.
    pub fn load_config(&self) -> LoadResult<DamageConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(DamageConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load global modifier tunables from `tunables.toml`, or neutral values if absent.
    pub fn load_tunables(&self) -> LoadResult<Tunables> {
        let path = self.data_dir.join("tunables.toml");
        if !path.exists() {
            return Ok(Tunables::default());
        }
        TunablesLoader::load(&path)
    }

    /// Load and validate every damage prototype catalog.
    pub fn load_prototypes(&self) -> LoadResult<PrototypeSet> {
        PrototypeLoader::load_dir(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());

        assert_eq!(factory.load_config().unwrap(), DamageConfig::default());
        assert_eq!(factory.load_tunables().unwrap(), Tunables::default());
        assert!(factory.load_prototypes().is_err());
    }

    #[test]
    fn loads_bundled_data_directory() {
        let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../data");
        let factory = ContentFactory::new(data_dir);

        let prototypes = factory.load_prototypes().unwrap();
        assert!(prototypes.container("Biological").is_some());
        assert!(prototypes.group("Brute").is_some());

        let config = factory.load_config().unwrap();
        assert!(!config.default_radiation_types.is_empty());

        factory.load_tunables().unwrap();
    }
}
