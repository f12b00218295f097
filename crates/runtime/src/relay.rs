//! Delivery of the modify stage to equipped items.
//!
//! The relay runs after the entity's own modify listeners. Items are visited
//! in ascending slot-bit order; an item is skipped when its slot is outside
//! the event's [`DamageModifyEvent::target_slots`].

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use damage_core::{DamageModifierSet, DamageModifyEvent, EntityId, SlotFlags};
use tracing::debug;

/// Routes a modify event to whatever an entity has equipped.
pub trait InventoryRelay: Send + Sync {
    fn relay(&self, entity: EntityId, event: &mut DamageModifyEvent);

    /// Called when `entity` stops being damageable.
    fn entity_removed(&self, _entity: EntityId) {}
}

/// An equipped item carrying its own resistances.
#[derive(Clone, Debug, PartialEq)]
pub struct ArmorPiece {
    pub name: String,
    pub slot: SlotFlags,
    pub modifiers: DamageModifierSet,
}

impl ArmorPiece {
    pub fn new(name: impl Into<String>, slot: SlotFlags, modifiers: DamageModifierSet) -> Self {
        Self {
            name: name.into(),
            slot,
            modifiers,
        }
    }
}

type Loadouts = BTreeMap<EntityId, BTreeMap<u16, ArmorPiece>>;

/// Armour worn per entity, one piece per slot.
///
/// Cloning yields another handle to the same loadouts, so equipment can be
/// changed after the relay has been handed to the system.
#[derive(Clone, Debug, Default)]
pub struct EquipmentRelay {
    loadouts: Arc<RwLock<Loadouts>>,
}

impl EquipmentRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equips `piece`, returning whatever previously occupied its slot.
    pub fn equip(&self, entity: EntityId, piece: ArmorPiece) -> Option<ArmorPiece> {
        let mut loadouts = self.loadouts.write().unwrap_or_else(PoisonError::into_inner);
        loadouts
            .entry(entity)
            .or_default()
            .insert(piece.slot.bits(), piece)
    }

    pub fn unequip(&self, entity: EntityId, slot: SlotFlags) -> Option<ArmorPiece> {
        let mut loadouts = self.loadouts.write().unwrap_or_else(PoisonError::into_inner);
        let loadout = loadouts.get_mut(&entity)?;
        let removed = loadout.remove(&slot.bits());
        if loadout.is_empty() {
            loadouts.remove(&entity);
        }
        removed
    }

    /// Equipped pieces in delivery order.
    pub fn equipped(&self, entity: EntityId) -> Vec<ArmorPiece> {
        let loadouts = self.loadouts.read().unwrap_or_else(PoisonError::into_inner);
        loadouts
            .get(&entity)
            .map(|loadout| loadout.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl InventoryRelay for EquipmentRelay {
    fn relay(&self, entity: EntityId, event: &mut DamageModifyEvent) {
        let loadouts = self.loadouts.read().unwrap_or_else(PoisonError::into_inner);
        let Some(loadout) = loadouts.get(&entity) else {
            return;
        };

        let targets = event.target_slots();
        for piece in loadout.values() {
            if !targets.intersects(piece.slot) {
                continue;
            }
            event.damage = piece.modifiers.apply(&event.damage);
            debug!(
                target: "damage::relay",
                entity = %entity,
                item = %piece.name,
                damage = %event.damage,
                "armor modified damage"
            );
        }
    }

    fn entity_removed(&self, entity: EntityId) {
        let mut loadouts = self.loadouts.write().unwrap_or_else(PoisonError::into_inner);
        loadouts.remove(&entity);
    }
}
