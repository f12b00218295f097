use super::ids::{DamageContainerId, DamageGroupId, DamageModifierSetId, DamageTypeId};
use crate::resistance::DamageModifierSet;

/// An atomic damage kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageTypePrototype {
    pub id: DamageTypeId,
    /// Display name; never used for lookups.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
}

impl DamageTypePrototype {
    pub fn new(id: impl Into<DamageTypeId>) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
        }
    }
}

/// A named group of damage types.
///
/// Groups only contain types, never other groups, so membership is flat and
/// cannot be cyclic. They exist for UI grouping and container convenience;
/// damage is never stored per group.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageGroupPrototype {
    pub id: DamageGroupId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub damage_types: Vec<DamageTypeId>,
}

impl DamageGroupPrototype {
    pub fn new<I, T>(id: impl Into<DamageGroupId>, damage_types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DamageTypeId>,
    {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            damage_types: damage_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, damage_type: &DamageTypeId) -> bool {
        self.damage_types.contains(damage_type)
    }
}

/// Declares which damage types an entity accepts, explicitly or via groups.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageContainerPrototype {
    pub id: DamageContainerId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub supported_groups: Vec<DamageGroupId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub supported_types: Vec<DamageTypeId>,
}

impl DamageContainerPrototype {
    pub fn new(id: impl Into<DamageContainerId>) -> Self {
        Self {
            id: id.into(),
            supported_groups: Vec::new(),
            supported_types: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<DamageGroupId>) -> Self {
        self.supported_groups.push(group.into());
        self
    }

    #[must_use]
    pub fn with_type(mut self, damage_type: impl Into<DamageTypeId>) -> Self {
        self.supported_types.push(damage_type.into());
        self
    }
}

/// A named resistance set that entities or armour can refer to.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageModifierSetPrototype {
    pub id: DamageModifierSetId,
    pub modifiers: DamageModifierSet,
}

impl DamageModifierSetPrototype {
    pub fn new(id: impl Into<DamageModifierSetId>, modifiers: DamageModifierSet) -> Self {
        Self {
            id: id.into(),
            modifiers,
        }
    }
}
