//! Damage prototype catalog loader.
//!
//! Each prototype kind lives in its own RON file so a reload can name exactly
//! which kinds changed.

use std::path::Path;

use damage_core::{
    DamageContainerPrototype, DamageGroupPrototype, DamageModifierSetPrototype,
    DamageTypePrototype, PrototypeKind, PrototypeSet,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Damage type catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DamageTypeCatalog {
    pub types: Vec<DamageTypePrototype>,
}

/// Damage group catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DamageGroupCatalog {
    pub groups: Vec<DamageGroupPrototype>,
}

/// Damage container catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DamageContainerCatalog {
    pub containers: Vec<DamageContainerPrototype>,
}

/// Resistance set catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifierSetCatalog {
    pub modifier_sets: Vec<DamageModifierSetPrototype>,
}

/// Loader for the full damage prototype set.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── damage_types.ron
/// ├── damage_groups.ron
/// ├── damage_containers.ron
/// └── modifier_sets.ron      (optional)
/// ```
pub struct PrototypeLoader;

impl PrototypeLoader {
    /// File name holding the catalog for `kind`.
    pub const fn file_name(kind: PrototypeKind) -> &'static str {
        match kind {
            PrototypeKind::DamageType => "damage_types.ron",
            PrototypeKind::DamageGroup => "damage_groups.ron",
            PrototypeKind::DamageContainer => "damage_containers.ron",
            PrototypeKind::DamageModifierSet => "modifier_sets.ron",
        }
    }

    /// Load and validate every catalog in `dir`.
    ///
    /// The resistance set catalog may be absent; the other three are required.
    pub fn load_dir(dir: &Path) -> LoadResult<PrototypeSet> {
        let types = read_file(&dir.join(Self::file_name(PrototypeKind::DamageType)))?;
        let groups = read_file(&dir.join(Self::file_name(PrototypeKind::DamageGroup)))?;
        let containers = read_file(&dir.join(Self::file_name(PrototypeKind::DamageContainer)))?;

        let sets_path = dir.join(Self::file_name(PrototypeKind::DamageModifierSet));
        let sets = if sets_path.exists() {
            Some(read_file(&sets_path)?)
        } else {
            None
        };

        Self::from_ron(&types, &groups, &containers, sets.as_deref())
    }

    /// Parse and validate catalogs from RON text.
    pub fn from_ron(
        types: &str,
        groups: &str,
        containers: &str,
        modifier_sets: Option<&str>,
    ) -> LoadResult<PrototypeSet> {
        let types: DamageTypeCatalog = ron::from_str(types)
            .map_err(|e| anyhow::anyhow!("Failed to parse damage type catalog RON: {}", e))?;
        let groups: DamageGroupCatalog = ron::from_str(groups)
            .map_err(|e| anyhow::anyhow!("Failed to parse damage group catalog RON: {}", e))?;
        let containers: DamageContainerCatalog = ron::from_str(containers)
            .map_err(|e| anyhow::anyhow!("Failed to parse damage container catalog RON: {}", e))?;
        let modifier_sets: ModifierSetCatalog = match modifier_sets {
            Some(text) => ron::from_str(text)
                .map_err(|e| anyhow::anyhow!("Failed to parse modifier set catalog RON: {}", e))?,
            None => ModifierSetCatalog::default(),
        };

        let types = types.types.into_iter().map(|mut proto| {
            if proto.name.is_empty() {
                proto.name = proto.id.to_string();
            }
            proto
        });

        PrototypeSet::from_parts(
            types,
            groups.groups,
            containers.containers,
            modifier_sets.modifier_sets,
        )
        .map_err(|e| anyhow::anyhow!("Invalid damage prototypes: {}", e))
    }
}
