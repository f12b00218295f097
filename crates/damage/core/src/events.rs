//! Payloads raised at each stage of the damage pipeline.
//!
//! Stages run in a fixed order for every change:
//!
//! ```text
//! BeforeDamageChangedEvent  (cancellable)
//!   → DamageModifyEvent      (listeners and armour rewrite the working damage)
//!   → merge + recompute
//!   → DamageChangedEvent     (informational, read-only)
//! ```

use crate::entity::EntityId;
use crate::slots::SlotFlags;
use crate::specifier::DamageSpecifier;
use crate::state::DamageableState;

/// Raised before damage is dealt so listeners can cancel it.
///
/// Setting `cancelled` aborts the change: nothing is mutated and no further
/// events are raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeforeDamageChangedEvent {
    pub damage: DamageSpecifier,
    pub origin: Option<EntityId>,
    pub cancelled: bool,
}

impl BeforeDamageChangedEvent {
    pub fn new(damage: DamageSpecifier, origin: Option<EntityId>) -> Self {
        Self {
            damage,
            origin,
            cancelled: false,
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}

/// Raised so armour and other modifiers can rewrite incoming damage.
///
/// `damage` starts equal to the original and is what will be merged. It may
/// be reduced, amplified, zeroed, or gain new types. This stage cannot cancel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageModifyEvent {
    original_damage: DamageSpecifier,
    pub damage: DamageSpecifier,
    origin: Option<EntityId>,
}

impl DamageModifyEvent {
    pub fn new(damage: DamageSpecifier, origin: Option<EntityId>) -> Self {
        Self {
            original_damage: damage.clone(),
            damage,
            origin,
        }
    }

    /// Damage before any modifier ran.
    pub fn original_damage(&self) -> &DamageSpecifier {
        &self.original_damage
    }

    pub fn origin(&self) -> Option<EntityId> {
        self.origin
    }

    /// Equipment slots that receive this event when relayed to worn items.
    ///
    /// Everything except pockets.
    pub fn target_slots(&self) -> SlotFlags {
        !SlotFlags::POCKET
    }
}

/// Raised after an entity's damage changed.
///
/// Informational only. `damage_delta` is `None` when the damage was set
/// directly rather than changed by a delta; in that case neither flag is set.
#[derive(Clone, Copy, Debug)]
pub struct DamageChangedEvent<'a> {
    damageable: &'a DamageableState,
    damage_delta: Option<&'a DamageSpecifier>,
    damage_increased: bool,
    interrupts_do_afters: bool,
    origin: Option<EntityId>,
}

impl<'a> DamageChangedEvent<'a> {
    /// `interrupts_do_afters` is the caller's request; the stored flag is only
    /// set when the delta also increased damage.
    pub fn new(
        damageable: &'a DamageableState,
        damage_delta: Option<&'a DamageSpecifier>,
        interrupts_do_afters: bool,
        origin: Option<EntityId>,
    ) -> Self {
        let damage_increased = damage_delta.is_some_and(DamageSpecifier::any_positive);
        Self {
            damageable,
            damage_delta,
            damage_increased,
            interrupts_do_afters: interrupts_do_afters && damage_increased,
            origin,
        }
    }

    pub fn damageable(&self) -> &'a DamageableState {
        self.damageable
    }

    pub fn damage_delta(&self) -> Option<&'a DamageSpecifier> {
        self.damage_delta
    }

    /// True when at least one applied amount was harmful.
    pub fn damage_increased(&self) -> bool {
        self.damage_increased
    }

    /// True when in-progress activities should be interrupted.
    pub fn interrupts_do_afters(&self) -> bool {
        self.interrupts_do_afters
    }

    pub fn origin(&self) -> Option<EntityId> {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::FixedPoint2;

    #[test]
    fn healing_never_interrupts() {
        let state = DamageableState::new();
        let heal = DamageSpecifier::from_type("Blunt", FixedPoint2::new(-4));

        let event = DamageChangedEvent::new(&state, Some(&heal), true, None);

        assert!(!event.damage_increased());
        assert!(!event.interrupts_do_afters());
    }

    #[test]
    fn harm_interrupts_only_when_requested() {
        let state = DamageableState::new();
        let hit = DamageSpecifier::from_type("Blunt", FixedPoint2::new(10));

        assert!(DamageChangedEvent::new(&state, Some(&hit), true, None).interrupts_do_afters());
        assert!(!DamageChangedEvent::new(&state, Some(&hit), false, None).interrupts_do_afters());
    }

    #[test]
    fn absolute_set_has_no_flags() {
        let state = DamageableState::new();
        let event = DamageChangedEvent::new(&state, None, true, Some(EntityId(3)));
        assert!(!event.damage_increased());
        assert!(!event.interrupts_do_afters());
        assert_eq!(event.origin(), Some(EntityId(3)));
    }

    #[test]
    fn modify_event_keeps_original() {
        let hit = DamageSpecifier::from_type("Blunt", FixedPoint2::new(10));
        let mut event = DamageModifyEvent::new(hit.clone(), None);
        event.damage = event.damage.scaled(0.5);

        assert_eq!(event.original_damage(), &hit);
        assert_eq!(event.damage.get("Blunt"), FixedPoint2::new(5));
        assert!(!event.target_slots().contains(SlotFlags::POCKET));
        assert!(event.target_slots().contains(SlotFlags::OUTERCLOTHING));
    }
}
