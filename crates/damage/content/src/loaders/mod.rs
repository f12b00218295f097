//! Content loaders for reading damage data from files.

pub mod config;
pub mod factory;
pub mod prototypes;
pub mod tunables;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use prototypes::PrototypeLoader;
pub use tunables::{Tunables, TunablesLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
