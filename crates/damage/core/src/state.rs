//! Per-entity damage state.

use std::collections::BTreeMap;

use crate::fixed::FixedPoint2;
use crate::prototype::{
    DamageContainerId, DamageGroupId, DamageGroupPrototype, DamageModifierSetId, DamageTypeId,
};
use crate::specifier::DamageSpecifier;

/// Damage type used for radiation when nothing else is configured.
pub const DEFAULT_RADIATION_TYPE: &str = "Radiation";

/// Damage carried by one entity.
///
/// `damage` is the only source of truth. The per-group aggregate and the total
/// are derived from it and are always recomputed in full, never patched
/// incrementally, so they cannot drift from the stored specifier even after an
/// external overwrite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageableState {
    damage_container: Option<DamageContainerId>,
    modifier_set: Option<DamageModifierSetId>,
    damage: DamageSpecifier,
    damage_per_group: BTreeMap<DamageGroupId, FixedPoint2>,
    total_damage: FixedPoint2,
    radiation_damage_types: Vec<DamageTypeId>,
}

impl DamageableState {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_container(mut self, container: impl Into<DamageContainerId>) -> Self {
        self.damage_container = Some(container.into());
        self
    }

    #[must_use]
    pub fn with_modifier_set(mut self, set: impl Into<DamageModifierSetId>) -> Self {
        self.modifier_set = Some(set.into());
        self
    }

    /// Initial damage (e.g. an entity spawned pre-damaged).
    ///
    /// Aggregates are not valid until [`DamageableState::recompute`] runs.
    #[must_use]
    pub fn with_damage(mut self, damage: DamageSpecifier) -> Self {
        self.damage = damage;
        self
    }

    #[must_use]
    pub fn with_radiation_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DamageTypeId>,
    {
        self.radiation_damage_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn damage(&self) -> &DamageSpecifier {
        &self.damage
    }

    pub fn damage_per_group(&self) -> &BTreeMap<DamageGroupId, FixedPoint2> {
        &self.damage_per_group
    }

    pub fn total_damage(&self) -> FixedPoint2 {
        self.total_damage
    }

    pub fn container(&self) -> Option<&DamageContainerId> {
        self.damage_container.as_ref()
    }

    pub fn modifier_set(&self) -> Option<&DamageModifierSetId> {
        self.modifier_set.as_ref()
    }

    pub fn radiation_damage_types(&self) -> &[DamageTypeId] {
        &self.radiation_damage_types
    }

    /// Recomputes the per-group aggregate and the total from `damage`.
    pub fn recompute<'a>(&mut self, groups: impl IntoIterator<Item = &'a DamageGroupPrototype>) {
        self.damage.damage_per_group_into(groups, &mut self.damage_per_group);
        self.total_damage = self.damage.total();
    }

    /// Merges `delta` into the stored damage, returning what actually changed.
    ///
    /// Stored amounts never go below zero; healing past zero is absorbed and
    /// the returned delta reports only the applied part. Types whose amount
    /// does not change are left out of the result. Aggregates must be
    /// recomputed afterwards.
    pub fn merge_clamped(&mut self, delta: &DamageSpecifier) -> DamageSpecifier {
        let mut applied = DamageSpecifier::new();

        for (damage_type, &amount) in delta {
            let old = self.damage.get(damage_type.as_str());
            let new = (old + amount).max(FixedPoint2::ZERO);
            if new == old {
                continue;
            }
            self.damage.insert(damage_type.clone(), new);
            applied.insert(damage_type.clone(), new - old);
        }

        applied
    }

    /// Replaces the stored damage wholesale. Aggregates must be recomputed afterwards.
    pub fn replace_damage(&mut self, damage: DamageSpecifier) {
        self.damage = damage;
    }

    /// Captures the replicated form of this state.
    pub fn snapshot(&self) -> DamageableSnapshot {
        DamageableSnapshot {
            damage_container: self.damage_container.clone(),
            modifier_set: self.modifier_set.clone(),
            damage: self.damage.clone(),
            total_damage: self.total_damage,
        }
    }

    /// Overwrites the replicated fields from `snapshot`.
    ///
    /// The snapshot's aggregate is ignored; the caller recomputes it from the
    /// incoming specifier.
    pub fn apply_snapshot(&mut self, snapshot: DamageableSnapshot) {
        self.damage_container = snapshot.damage_container;
        self.modifier_set = snapshot.modifier_set;
        self.damage = snapshot.damage;
    }
}

impl Default for DamageableState {
    fn default() -> Self {
        Self {
            damage_container: None,
            modifier_set: None,
            damage: DamageSpecifier::new(),
            damage_per_group: BTreeMap::new(),
            total_damage: FixedPoint2::ZERO,
            radiation_damage_types: vec![DamageTypeId::from(DEFAULT_RADIATION_TYPE)],
        }
    }
}

/// Replicated form of [`DamageableState`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageableSnapshot {
    pub damage_container: Option<DamageContainerId>,
    pub modifier_set: Option<DamageModifierSetId>,
    pub damage: DamageSpecifier,
    /// Sent for display only; never trusted by the receiver.
    #[cfg_attr(feature = "serde", serde(default))]
    pub total_damage: FixedPoint2,
}
