//! Global modifier tunables loader.

use std::collections::BTreeMap;
use std::path::Path;

use damage_core::{GlobalModifierSet, ModifierCategory};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Initial values for the global damage multipliers.
///
/// ```toml
/// [modifiers]
/// melee = 1.5
/// all_heal = 0.5
/// ```
///
/// Categories that are not listed keep the neutral multiplier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tunables {
    #[serde(default)]
    pub modifiers: BTreeMap<ModifierCategory, f32>,
}

impl Tunables {
    /// Overlay these values onto a multiplier set.
    pub fn to_modifier_set(&self) -> GlobalModifierSet {
        let mut set = GlobalModifierSet::default();
        for (&category, &value) in &self.modifiers {
            set.set(category, value);
        }
        set
    }
}

/// Loader for [`Tunables`] from TOML files.
pub struct TunablesLoader;

impl TunablesLoader {
    /// Load tunables from a TOML file.
    pub fn load(path: &Path) -> LoadResult<Tunables> {
        let content = read_file(path)?;
        Self::from_toml(&content)
    }

    /// Parse tunables from TOML text.
    pub fn from_toml(content: &str) -> LoadResult<Tunables> {
        let tunables: Tunables = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tunables TOML: {}", e))?;

        if let Some((category, value)) = tunables
            .modifiers
            .iter()
            .find(|(_, value)| !value.is_finite() || **value < 0.0)
        {
            anyhow::bail!("Modifier '{}' must be a non-negative number, got {}", category, value);
        }

        Ok(tunables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snake_case_categories() {
        let tunables = TunablesLoader::from_toml(
            r#"
            [modifiers]
            melee = 1.5
            all_heal = 0.5
            "#,
        )
        .unwrap();

        let set = tunables.to_modifier_set();
        assert_eq!(set.get(ModifierCategory::Melee), 1.5);
        assert_eq!(set.get(ModifierCategory::AllHeal), 0.5);
        assert_eq!(set.get(ModifierCategory::Explosion), 1.0);
    }

    #[test]
    fn empty_document_is_neutral() {
        let tunables = TunablesLoader::from_toml("").unwrap();
        assert_eq!(tunables.to_modifier_set(), GlobalModifierSet::default());
    }

    #[test]
    fn rejects_unknown_category() {
        assert!(TunablesLoader::from_toml("[modifiers]\nlaser = 2.0").is_err());
    }

    #[test]
    fn rejects_negative_multiplier() {
        let err = TunablesLoader::from_toml("[modifiers]\nthrown = -1.0").unwrap_err();
        assert!(err.to_string().contains("thrown"));
    }
}
