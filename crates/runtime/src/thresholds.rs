//! Mob state thresholds driven by total damage.
//!
//! [`MobThresholdTracker`] consumes change events and moves each tracked
//! entity between [`MobState`]s. Leaving [`MobState::Dead`] is refused unless
//! revives are currently allowed for that entity, which only
//! [`crate::DamageableSystem::rejuvenate`] grants, and only for its duration.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use damage_core::{DamageChangedEvent, EntityId, FixedPoint2};
use tracing::{debug, info};

/// Permission switch for leaving the dead state.
pub trait ReviveGuard: Send + Sync {
    fn set_allow_revives(&self, entity: EntityId, allow: bool);

    /// Called when `entity` stops being damageable.
    fn entity_removed(&self, _entity: EntityId) {}
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum MobState {
    Alive,
    Critical,
    Dead,
}

/// A recorded state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MobTransition {
    pub from: MobState,
    pub to: MobState,
    pub total_damage: FixedPoint2,
}

#[derive(Debug)]
struct MobRecord {
    /// Ascending by damage.
    thresholds: Vec<(FixedPoint2, MobState)>,
    state: MobState,
    allow_revives: bool,
    transitions: Vec<MobTransition>,
}

impl MobRecord {
    fn state_for(&self, total: FixedPoint2) -> MobState {
        self.thresholds
            .iter()
            .rev()
            .find(|(threshold, _)| total >= *threshold)
            .map_or(MobState::Alive, |&(_, state)| state)
    }
}

/// Cloneable handle to per-entity mob states.
#[derive(Clone, Debug, Default)]
pub struct MobThresholdTracker {
    records: Arc<Mutex<BTreeMap<EntityId, MobRecord>>>,
}

impl MobThresholdTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 0 → alive, 100 → critical, 200 → dead.
    pub fn default_thresholds() -> Vec<(FixedPoint2, MobState)> {
        vec![
            (FixedPoint2::ZERO, MobState::Alive),
            (FixedPoint2::new(100), MobState::Critical),
            (FixedPoint2::new(200), MobState::Dead),
        ]
    }

    fn records(&self) -> MutexGuard<'_, BTreeMap<EntityId, MobRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts tracking `entity`, placing it in the state matching `total_damage`.
    pub fn track(
        &self,
        entity: EntityId,
        thresholds: impl IntoIterator<Item = (FixedPoint2, MobState)>,
        total_damage: FixedPoint2,
    ) {
        let mut thresholds: Vec<_> = thresholds.into_iter().collect();
        thresholds.sort_by_key(|(threshold, _)| *threshold);

        let mut record = MobRecord {
            thresholds,
            state: MobState::Alive,
            allow_revives: false,
            transitions: Vec::new(),
        };
        record.state = record.state_for(total_damage);
        self.records().insert(entity, record);
    }

    pub fn untrack(&self, entity: EntityId) -> bool {
        self.records().remove(&entity).is_some()
    }

    pub fn state(&self, entity: EntityId) -> Option<MobState> {
        self.records().get(&entity).map(|record| record.state)
    }

    pub fn transitions(&self, entity: EntityId) -> Vec<MobTransition> {
        self.records()
            .get(&entity)
            .map(|record| record.transitions.clone())
            .unwrap_or_default()
    }

    pub fn allows_revives(&self, entity: EntityId) -> bool {
        self.records()
            .get(&entity)
            .is_some_and(|record| record.allow_revives)
    }

    /// Re-evaluates `entity` against its thresholds.
    pub fn on_damage_changed(&self, entity: EntityId, event: &DamageChangedEvent<'_>) {
        let mut records = self.records();
        let Some(record) = records.get_mut(&entity) else {
            return;
        };

        let total = event.damageable().total_damage();
        let next = record.state_for(total);
        if next == record.state {
            return;
        }

        if record.state == MobState::Dead && !record.allow_revives {
            debug!(
                target: "damage::thresholds",
                entity = %entity,
                total = %total,
                attempted = %next,
                "revive refused"
            );
            return;
        }

        info!(
            target: "damage::thresholds",
            entity = %entity,
            from = %record.state,
            to = %next,
            total = %total,
            "mob state changed"
        );
        record.transitions.push(MobTransition {
            from: record.state,
            to: next,
            total_damage: total,
        });
        record.state = next;
    }

    /// A change listener feeding this tracker.
    pub fn listener(&self) -> impl FnMut(EntityId, &DamageChangedEvent<'_>) + Send + 'static {
        let tracker = self.clone();
        move |entity, event| tracker.on_damage_changed(entity, event)
    }
}

impl ReviveGuard for MobThresholdTracker {
    fn set_allow_revives(&self, entity: EntityId, allow: bool) {
        if let Some(record) = self.records().get_mut(&entity) {
            record.allow_revives = allow;
        }
    }

    fn entity_removed(&self, entity: EntityId) {
        self.untrack(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use damage_core::{DamageSpecifier, DamageableState};

    fn state_with(total: i32) -> DamageableState {
        let mut state = DamageableState::new()
            .with_damage(DamageSpecifier::from_type("Blunt", FixedPoint2::new(total)));
        state.recompute(std::iter::empty());
        state
    }

    fn feed(tracker: &MobThresholdTracker, entity: EntityId, total: i32) {
        let state = state_with(total);
        tracker.on_damage_changed(entity, &DamageChangedEvent::new(&state, None, false, None));
    }

    #[test]
    fn follows_thresholds() {
        let tracker = MobThresholdTracker::new();
        let entity = EntityId(1);
        tracker.track(entity, MobThresholdTracker::default_thresholds(), FixedPoint2::ZERO);

        feed(&tracker, entity, 150);
        assert_eq!(tracker.state(entity), Some(MobState::Critical));
        feed(&tracker, entity, 99);
        assert_eq!(tracker.state(entity), Some(MobState::Alive));

        let transitions = tracker.transitions(entity);
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].to, MobState::Critical);
        assert_eq!(transitions[1].from, MobState::Critical);
    }

    #[test]
    fn dead_stays_dead_without_permission() {
        let tracker = MobThresholdTracker::new();
        let entity = EntityId(2);
        tracker.track(entity, MobThresholdTracker::default_thresholds(), FixedPoint2::new(250));
        assert_eq!(tracker.state(entity), Some(MobState::Dead));

        feed(&tracker, entity, 0);
        assert_eq!(tracker.state(entity), Some(MobState::Dead));
        assert!(tracker.transitions(entity).is_empty());

        tracker.set_allow_revives(entity, true);
        assert!(tracker.allows_revives(entity));
        feed(&tracker, entity, 0);
        assert_eq!(tracker.state(entity), Some(MobState::Alive));
    }

    #[test]
    fn untracked_entities_are_ignored() {
        let tracker = MobThresholdTracker::new();
        feed(&tracker, EntityId(9), 500);
        tracker.set_allow_revives(EntityId(9), true);
        assert_eq!(tracker.state(EntityId(9)), None);
        assert!(!tracker.allows_revives(EntityId(9)));
    }
}
