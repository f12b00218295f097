use std::collections::BTreeMap;

use super::definitions::{
    DamageContainerPrototype, DamageGroupPrototype, DamageModifierSetPrototype,
    DamageTypePrototype,
};
use super::ids::{DamageContainerId, DamageGroupId, DamageModifierSetId, DamageTypeId};
use super::{PrototypeError, PrototypeKind};

/// The currently loaded damage definitions.
///
/// Maps are ordered so every iteration (and therefore every derived cache) is
/// deterministic for a given set of definitions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrototypeSet {
    types: BTreeMap<DamageTypeId, DamageTypePrototype>,
    groups: BTreeMap<DamageGroupId, DamageGroupPrototype>,
    containers: BTreeMap<DamageContainerId, DamageContainerPrototype>,
    modifier_sets: BTreeMap<DamageModifierSetId, DamageModifierSetPrototype>,
}

impl PrototypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles and validates a set from loose definitions.
    pub fn from_parts(
        types: impl IntoIterator<Item = DamageTypePrototype>,
        groups: impl IntoIterator<Item = DamageGroupPrototype>,
        containers: impl IntoIterator<Item = DamageContainerPrototype>,
        modifier_sets: impl IntoIterator<Item = DamageModifierSetPrototype>,
    ) -> Result<Self, PrototypeError> {
        let mut set = Self::new();
        for proto in types {
            set.insert_type(proto)?;
        }
        for proto in groups {
            set.insert_group(proto)?;
        }
        for proto in containers {
            set.insert_container(proto)?;
        }
        for proto in modifier_sets {
            set.insert_modifier_set(proto)?;
        }
        set.validate()?;
        Ok(set)
    }

    pub fn insert_type(&mut self, proto: DamageTypePrototype) -> Result<(), PrototypeError> {
        if self.types.contains_key(&proto.id) {
            return Err(duplicate(PrototypeKind::DamageType, proto.id.as_str()));
        }
        self.types.insert(proto.id.clone(), proto);
        Ok(())
    }

    pub fn insert_group(&mut self, proto: DamageGroupPrototype) -> Result<(), PrototypeError> {
        if self.groups.contains_key(&proto.id) {
            return Err(duplicate(PrototypeKind::DamageGroup, proto.id.as_str()));
        }
        self.groups.insert(proto.id.clone(), proto);
        Ok(())
    }

    pub fn insert_container(
        &mut self,
        proto: DamageContainerPrototype,
    ) -> Result<(), PrototypeError> {
        if self.containers.contains_key(&proto.id) {
            return Err(duplicate(PrototypeKind::DamageContainer, proto.id.as_str()));
        }
        self.containers.insert(proto.id.clone(), proto);
        Ok(())
    }

    pub fn insert_modifier_set(
        &mut self,
        proto: DamageModifierSetPrototype,
    ) -> Result<(), PrototypeError> {
        if self.modifier_sets.contains_key(&proto.id) {
            return Err(duplicate(PrototypeKind::DamageModifierSet, proto.id.as_str()));
        }
        self.modifier_sets.insert(proto.id.clone(), proto);
        Ok(())
    }

    /// Checks every cross-reference between definitions.
    ///
    /// Containers and groups may only name defined types, and containers may
    /// only name defined groups.
    pub fn validate(&self) -> Result<(), PrototypeError> {
        for group in self.groups.values() {
            if let Some(unknown) = group
                .damage_types
                .iter()
                .find(|ty| !self.types.contains_key(*ty))
            {
                return Err(PrototypeError::GroupUnknownType {
                    group: group.id.clone(),
                    damage_type: unknown.clone(),
                });
            }
        }

        for container in self.containers.values() {
            if let Some(unknown) = container
                .supported_types
                .iter()
                .find(|ty| !self.types.contains_key(*ty))
            {
                return Err(PrototypeError::ContainerUnknownType {
                    container: container.id.clone(),
                    damage_type: unknown.clone(),
                });
            }
            if let Some(unknown) = container
                .supported_groups
                .iter()
                .find(|group| !self.groups.contains_key(*group))
            {
                return Err(PrototypeError::ContainerUnknownGroup {
                    container: container.id.clone(),
                    group: unknown.clone(),
                });
            }
        }

        for set in self.modifier_sets.values() {
            if let Some(unknown) = set
                .modifiers
                .damage_types()
                .find(|ty| !self.types.contains_key(*ty))
            {
                return Err(PrototypeError::ModifierSetUnknownType {
                    set: set.id.clone(),
                    damage_type: unknown.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn damage_type(&self, id: &str) -> Option<&DamageTypePrototype> {
        self.types.get(id)
    }

    pub fn group(&self, id: &str) -> Option<&DamageGroupPrototype> {
        self.groups.get(id)
    }

    pub fn container(&self, id: &str) -> Option<&DamageContainerPrototype> {
        self.containers.get(id)
    }

    pub fn modifier_set(&self, id: &str) -> Option<&DamageModifierSetPrototype> {
        self.modifier_sets.get(id)
    }

    pub fn types(&self) -> impl Iterator<Item = &DamageTypePrototype> {
        self.types.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &DamageGroupPrototype> {
        self.groups.values()
    }

    pub fn containers(&self) -> impl Iterator<Item = &DamageContainerPrototype> {
        self.containers.values()
    }

    pub fn modifier_sets(&self) -> impl Iterator<Item = &DamageModifierSetPrototype> {
        self.modifier_sets.values()
    }
}

fn duplicate(kind: PrototypeKind, id: &str) -> PrototypeError {
    PrototypeError::Duplicate {
        kind,
        id: id.to_owned(),
    }
}
