//! The damage application engine and its lifecycle hooks.
//!
//! [`DamageableSystem`] owns every entity's [`DamageableState`] together with
//! the loaded prototypes and the published taxonomy. Each change runs the
//! stages in a fixed order:
//!
//! ```text
//! before-changed listeners   (may cancel; nothing else happens if they do)
//! entity resistance set      (skipped with ignore_resistances)
//! modify listeners + relay   (skipped with ignore_resistances)
//! clamped merge + recompute
//! changed listeners          (always, once the modify stage has run)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use damage_core::{
    BeforeDamageChangedEvent, DamageChangedEvent, DamageConfig, DamageError, DamageModifyEvent,
    DamageSource, DamageSpecifier, DamageTypeId, DamageableSnapshot, DamageableState, EntityId,
    FixedPoint2, PrototypeKind, PrototypeSet, ReloadBatch, TaxonomyCache,
};
use tracing::{debug, error, info, warn};

use crate::audit::audit_listener;
use crate::error::{Result, SystemError};
use crate::listeners::{ChangedListeners, ListenerRegistry};
use crate::modifiers::ModifierRegistry;
use crate::relay::InventoryRelay;
use crate::thresholds::ReviveGuard;

/// Per-call options for [`DamageableSystem::change_damage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeDamageOptions {
    /// Request that in-progress activities be interrupted. Only honoured when
    /// the change actually increased damage.
    pub interrupts_do_afters: bool,
    /// Skip the entity's resistance set and the whole modify stage.
    pub ignore_resistances: bool,
    pub origin: Option<EntityId>,
}

impl ChangeDamageOptions {
    #[must_use]
    pub fn with_origin(mut self, origin: EntityId) -> Self {
        self.origin = Some(origin);
        self
    }

    #[must_use]
    pub fn without_interrupt(mut self) -> Self {
        self.interrupts_do_afters = false;
        self
    }

    #[must_use]
    pub fn ignoring_resistances(mut self) -> Self {
        self.ignore_resistances = true;
        self
    }
}

impl Default for ChangeDamageOptions {
    fn default() -> Self {
        Self {
            interrupts_do_afters: true,
            ignore_resistances: false,
            origin: None,
        }
    }
}

/// What one applied change did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageChangeResult {
    /// The amounts actually merged, after clamping. Empty if nothing changed.
    pub delta: DamageSpecifier,
    pub damage_increased: bool,
    pub interrupts_do_afters: bool,
}

/// Terminal outcome of [`DamageableSystem::change_damage`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DamageChangeOutcome {
    /// A before-changed listener cancelled the change.
    Cancelled,
    Applied(DamageChangeResult),
}

impl DamageChangeOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn applied(&self) -> Option<&DamageChangeResult> {
        match self {
            Self::Cancelled => None,
            Self::Applied(result) => Some(result),
        }
    }
}

/// Damage pipeline over every damageable entity.
pub struct DamageableSystem {
    config: DamageConfig,
    prototypes: PrototypeSet,
    taxonomy: TaxonomyCache,
    entities: BTreeMap<EntityId, DamageableState>,
    modifiers: ModifierRegistry,
    before_changed: ListenerRegistry<BeforeDamageChangedEvent>,
    modify: ListenerRegistry<DamageModifyEvent>,
    changed: ChangedListeners,
    relay: Option<Box<dyn InventoryRelay>>,
    revive_guard: Option<Box<dyn ReviveGuard>>,
}

impl DamageableSystem {
    /// Creates the system and publishes the first taxonomy build.
    pub fn new(prototypes: PrototypeSet, config: DamageConfig) -> Result<Self> {
        let mut taxonomy = TaxonomyCache::new();
        if let Err(err) = taxonomy.rebuild(&prototypes) {
            error!(
                target: "damage::system",
                error = %err,
                "initial taxonomy build failed"
            );
            return Err(err.into());
        }

        let mut changed = ChangedListeners::new();
        if config.audit_changes {
            changed.subscribe("audit", audit_listener());
        }

        info!(
            target: "damage::system",
            types = prototypes.types().count(),
            groups = prototypes.groups().count(),
            containers = prototypes.containers().count(),
            "damageable system ready"
        );

        Ok(Self {
            config,
            prototypes,
            taxonomy,
            entities: BTreeMap::new(),
            modifiers: ModifierRegistry::new(),
            before_changed: ListenerRegistry::new(),
            modify: ListenerRegistry::new(),
            changed,
            relay: None,
            revive_guard: None,
        })
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: ModifierRegistry) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_relay(mut self, relay: impl InventoryRelay + 'static) -> Self {
        self.relay = Some(Box::new(relay));
        self
    }

    #[must_use]
    pub fn with_revive_guard(mut self, guard: impl ReviveGuard + 'static) -> Self {
        self.revive_guard = Some(Box::new(guard));
        self
    }

    pub fn config(&self) -> &DamageConfig {
        &self.config
    }

    pub fn prototypes(&self) -> &PrototypeSet {
        &self.prototypes
    }

    pub fn taxonomy(&self) -> &TaxonomyCache {
        &self.taxonomy
    }

    pub fn modifiers(&self) -> &ModifierRegistry {
        &self.modifiers
    }

    pub fn before_damage_changed(&mut self) -> &mut ListenerRegistry<BeforeDamageChangedEvent> {
        &mut self.before_changed
    }

    pub fn damage_modify(&mut self) -> &mut ListenerRegistry<DamageModifyEvent> {
        &mut self.modify
    }

    pub fn damage_changed(&mut self) -> &mut ChangedListeners {
        &mut self.changed
    }

    /// A fresh state carrying the configured radiation types.
    pub fn new_state(&self) -> DamageableState {
        DamageableState::new().with_radiation_types(self.config.default_radiation_types.clone())
    }

    /// Gives `entity` the damageable capability.
    ///
    /// Aggregates are seeded from whatever damage the state was built with.
    pub fn add_damageable(&mut self, entity: EntityId, mut state: DamageableState) -> Result<()> {
        if self.entities.contains_key(&entity) {
            return Err(SystemError::AlreadyDamageable(entity));
        }
        if let Some(container) = state.container() {
            self.taxonomy.supported_types(container.as_str())?;
        }

        state.recompute(self.prototypes.groups());
        debug!(
            target: "damage::system",
            entity = %entity,
            container = ?state.container().map(|c| c.as_str()),
            total = %state.total_damage(),
            "damageable added"
        );
        self.entities.insert(entity, state);
        Ok(())
    }

    /// Drops the entity and tells the relay and revive guard to forget it.
    pub fn remove_damageable(&mut self, entity: EntityId) -> Option<DamageableState> {
        let removed = self.entities.remove(&entity)?;
        if let Some(relay) = &self.relay {
            relay.entity_removed(entity);
        }
        if let Some(guard) = &self.revive_guard {
            guard.entity_removed(entity);
        }
        debug!(target: "damage::system", entity = %entity, "damageable removed");
        Some(removed)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn damageable(&self, entity: EntityId) -> Option<&DamageableState> {
        self.entities.get(&entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &DamageableState)> + '_ {
        self.entities.iter().map(|(&entity, state)| (entity, state))
    }

    /// Types accepted by the entity's container, or `None` if it has no container.
    pub fn supported_types(&self, entity: EntityId) -> Result<Option<&BTreeSet<DamageTypeId>>> {
        let state = self
            .entities
            .get(&entity)
            .ok_or(SystemError::NotDamageable(entity))?;
        match state.container() {
            Some(container) => Ok(Some(self.taxonomy.supported_types(container.as_str())?)),
            None => Ok(None),
        }
    }

    /// Applies a damage delta through the full pipeline.
    pub fn change_damage(
        &mut self,
        entity: EntityId,
        damage: DamageSpecifier,
        options: ChangeDamageOptions,
    ) -> Result<DamageChangeOutcome> {
        let Some(state) = self.entities.get(&entity) else {
            return Err(SystemError::NotDamageable(entity));
        };

        let mut before = BeforeDamageChangedEvent::new(damage, options.origin);
        self.before_changed.dispatch(entity, &mut before);
        if before.cancelled {
            debug!(
                target: "damage::system",
                entity = %entity,
                damage = %before.damage,
                "damage change cancelled"
            );
            return Ok(DamageChangeOutcome::Cancelled);
        }

        let mut damage = before.damage;
        if !options.ignore_resistances {
            if let Some(set_id) = state.modifier_set() {
                match self.prototypes.modifier_set(set_id.as_str()) {
                    Some(set) => damage = set.modifiers.apply(&damage),
                    None => warn!(
                        target: "damage::system",
                        entity = %entity,
                        modifier_set = %set_id,
                        "unknown damage modifier set, resistances skipped"
                    ),
                }
            }

            let mut modify = DamageModifyEvent::new(damage, options.origin);
            self.modify.dispatch(entity, &mut modify);
            if let Some(relay) = &self.relay {
                relay.relay(entity, &mut modify);
            }
            damage = modify.damage;
        }

        let state = self
            .entities
            .get_mut(&entity)
            .ok_or(SystemError::NotDamageable(entity))?;
        let delta = state.merge_clamped(&damage);
        if !delta.is_empty() {
            state.recompute(self.prototypes.groups());
        }

        let event =
            DamageChangedEvent::new(state, Some(&delta), options.interrupts_do_afters, options.origin);
        let damage_increased = event.damage_increased();
        let interrupts_do_afters = event.interrupts_do_afters();

        debug!(
            target: "damage::system",
            entity = %entity,
            delta = %delta,
            total = %state.total_damage(),
            increased = damage_increased,
            "damage changed"
        );
        self.changed.dispatch(entity, &event);

        Ok(DamageChangeOutcome::Applied(DamageChangeResult {
            delta,
            damage_increased,
            interrupts_do_afters,
        }))
    }

    /// Converts radiation into damage of the entity's radiation types.
    ///
    /// The amount is scaled by the global modifiers for
    /// [`DamageSource::Radiation`] and never interrupts activities.
    pub fn irradiate(
        &mut self,
        entity: EntityId,
        total_rads: f32,
        origin: Option<EntityId>,
    ) -> Result<DamageChangeOutcome> {
        let state = self
            .entities
            .get(&entity)
            .ok_or(SystemError::NotDamageable(entity))?;

        let amount = FixedPoint2::from_f32(total_rads);
        let damage: DamageSpecifier = state
            .radiation_damage_types()
            .iter()
            .map(|damage_type| (damage_type.clone(), amount))
            .collect();
        let damage = self.modifiers.scale(DamageSource::Radiation, &damage);

        let options = ChangeDamageOptions {
            interrupts_do_afters: false,
            ignore_resistances: false,
            origin,
        };
        self.change_damage(entity, damage, options)
    }

    /// Replaces the stored damage wholesale.
    ///
    /// Raises a change event without a delta.
    pub fn set_all_damage(&mut self, entity: EntityId, damage: DamageSpecifier) -> Result<()> {
        let state = self
            .entities
            .get_mut(&entity)
            .ok_or(SystemError::NotDamageable(entity))?;

        state.replace_damage(damage);
        state.recompute(self.prototypes.groups());

        debug!(
            target: "damage::system",
            entity = %entity,
            total = %state.total_damage(),
            "damage set"
        );
        let event = DamageChangedEvent::new(state, None, false, None);
        self.changed.dispatch(entity, &event);
        Ok(())
    }

    pub fn clear_all_damage(&mut self, entity: EntityId) -> Result<()> {
        self.set_all_damage(entity, DamageSpecifier::new())
    }

    /// Clears all damage while revives are permitted.
    ///
    /// The revive guard is opened only for the duration of the clear.
    pub fn rejuvenate(&mut self, entity: EntityId) -> Result<()> {
        if !self.contains(entity) {
            return Err(SystemError::NotDamageable(entity));
        }

        if let Some(guard) = &self.revive_guard {
            guard.set_allow_revives(entity, true);
        }
        let cleared = self.clear_all_damage(entity);
        if let Some(guard) = &self.revive_guard {
            guard.set_allow_revives(entity, false);
        }

        info!(target: "damage::system", entity = %entity, "entity rejuvenated");
        cleared
    }

    /// Accepts replicated state from an external authority.
    ///
    /// The snapshot's aggregate is never trusted; it is recomputed here.
    pub fn apply_replicated_state(
        &mut self,
        entity: EntityId,
        snapshot: DamageableSnapshot,
    ) -> Result<()> {
        let state = self
            .entities
            .get_mut(&entity)
            .ok_or(SystemError::NotDamageable(entity))?;

        let claimed_total = snapshot.total_damage;
        state.apply_snapshot(snapshot);
        state.recompute(self.prototypes.groups());

        if claimed_total != state.total_damage() {
            debug!(
                target: "damage::system",
                entity = %entity,
                claimed = %claimed_total,
                total = %state.total_damage(),
                "replicated aggregate disagreed and was recomputed"
            );
        }

        let event = DamageChangedEvent::new(state, None, false, None);
        self.changed.dispatch(entity, &event);
        Ok(())
    }

    /// Swaps in reloaded prototypes.
    ///
    /// The incoming set is validated first, and a set that drops a container
    /// still used by a live entity is refused. The taxonomy is rebuilt once
    /// when the batch touched containers or groups. On any rejection the
    /// previous prototypes and index stay in place. Group changes recompute
    /// every entity's aggregate without raising events. Returns whether the
    /// taxonomy was rebuilt.
    pub fn on_prototypes_reloaded(
        &mut self,
        prototypes: PrototypeSet,
        batch: &ReloadBatch,
    ) -> Result<bool> {
        if batch.is_empty() {
            return Ok(false);
        }

        if let Err(err) = self.check_reload(&prototypes, batch) {
            self.log_rejected_reload(&err);
            return Err(err);
        }

        let rebuild = batch.was_modified(PrototypeKind::DamageContainer)
            || batch.was_modified(PrototypeKind::DamageGroup);

        if rebuild && let Err(err) = self.taxonomy.rebuild(&prototypes) {
            let err = SystemError::from(err);
            self.log_rejected_reload(&err);
            return Err(err);
        }

        self.prototypes = prototypes;

        if batch.was_modified(PrototypeKind::DamageGroup) {
            for state in self.entities.values_mut() {
                state.recompute(self.prototypes.groups());
            }
        }

        info!(
            target: "damage::system",
            kinds = ?batch.kinds().collect::<Vec<_>>(),
            rebuilt = rebuild,
            generation = self.taxonomy.generation(),
            "prototypes reloaded"
        );
        Ok(rebuild)
    }

    fn check_reload(&self, prototypes: &PrototypeSet, batch: &ReloadBatch) -> Result<()> {
        prototypes.validate()?;

        if !batch.was_modified(PrototypeKind::DamageContainer) {
            return Ok(());
        }

        let mut in_use = None;
        for (&entity, state) in &self.entities {
            let Some(container) = state.container() else {
                continue;
            };
            if prototypes.container(container.as_str()).is_some() {
                continue;
            }
            error!(
                target: "damage::system",
                entity = %entity,
                container = %container,
                "reload removes a container that is still in use"
            );
            in_use.get_or_insert_with(|| SystemError::ContainerInUse {
                entity,
                container: container.clone(),
            });
        }
        in_use.map_or(Ok(()), Err)
    }

    fn log_rejected_reload(&self, err: &SystemError) {
        let severity = err.severity();
        if severity.is_recoverable() {
            warn!(
                target: "damage::system",
                error = %err,
                severity = severity.as_str(),
                generation = self.taxonomy.generation(),
                "prototype reload rejected, keeping previous prototypes"
            );
        } else {
            error!(
                target: "damage::system",
                error = %err,
                severity = severity.as_str(),
                generation = self.taxonomy.generation(),
                "prototype reload rejected, keeping previous prototypes"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use damage_core::{
        DamageContainerPrototype, DamageGroupPrototype, DamageModifierSet,
        DamageModifierSetPrototype, DamageTypePrototype, ModifierCategory,
    };

    fn prototypes() -> PrototypeSet {
        PrototypeSet::from_parts(
            ["Blunt", "Slash", "Heat", "Radiation"].map(DamageTypePrototype::new),
            [
                DamageGroupPrototype::new("Brute", ["Blunt", "Slash"]),
                DamageGroupPrototype::new("Burn", ["Heat"]),
                DamageGroupPrototype::new("Toxin", ["Radiation"]),
            ],
            [DamageContainerPrototype::new("Biological")
                .with_group("Brute")
                .with_group("Burn")
                .with_group("Toxin")],
            [DamageModifierSetPrototype::new(
                "Tough",
                DamageModifierSet::new().with_coefficient("Blunt", 0.5),
            )],
        )
        .unwrap()
    }

    fn quiet_config() -> DamageConfig {
        DamageConfig {
            audit_changes: false,
            ..DamageConfig::default()
        }
    }

    fn system() -> DamageableSystem {
        DamageableSystem::new(prototypes(), quiet_config()).unwrap()
    }

    fn blunt(amount: i32) -> DamageSpecifier {
        DamageSpecifier::from_type("Blunt", FixedPoint2::new(amount))
    }

    #[test]
    fn unknown_entity_is_not_damageable() {
        let mut system = system();
        let err = system
            .change_damage(EntityId(1), blunt(1), ChangeDamageOptions::default())
            .unwrap_err();
        assert_eq!(err, SystemError::NotDamageable(EntityId(1)));
    }

    #[test]
    fn add_seeds_aggregates_and_rejects_duplicates() {
        let mut system = system();
        let entity = EntityId(1);
        let state = system.new_state().with_damage(blunt(7));
        system.add_damageable(entity, state).unwrap();

        let state = system.damageable(entity).unwrap();
        assert_eq!(state.total_damage(), FixedPoint2::new(7));
        assert_eq!(state.damage_per_group()["Brute"], FixedPoint2::new(7));

        assert_eq!(
            system.add_damageable(entity, DamageableState::new()),
            Err(SystemError::AlreadyDamageable(entity))
        );
    }

    #[test]
    fn add_rejects_unknown_container() {
        let mut system = system();
        let state = DamageableState::new().with_container("Ghost");
        assert!(matches!(
            system.add_damageable(EntityId(1), state),
            Err(SystemError::Taxonomy(_))
        ));
    }

    #[test]
    fn entity_resistances_apply_unless_ignored() {
        let mut system = system();
        let entity = EntityId(1);
        system
            .add_damageable(entity, DamageableState::new().with_modifier_set("Tough"))
            .unwrap();

        system
            .change_damage(entity, blunt(10), ChangeDamageOptions::default())
            .unwrap();
        assert_eq!(system.damageable(entity).unwrap().total_damage(), FixedPoint2::new(5));

        system
            .change_damage(
                entity,
                blunt(10),
                ChangeDamageOptions::default().ignoring_resistances(),
            )
            .unwrap();
        assert_eq!(system.damageable(entity).unwrap().total_damage(), FixedPoint2::new(15));
    }

    #[test]
    fn ignore_resistances_skips_modify_listeners() {
        let mut system = system();
        let entity = EntityId(1);
        system.add_damageable(entity, DamageableState::new()).unwrap();
        system
            .damage_modify()
            .subscribe("zero", |_, event| event.damage = DamageSpecifier::new());

        let outcome = system
            .change_damage(
                entity,
                blunt(3),
                ChangeDamageOptions::default().ignoring_resistances(),
            )
            .unwrap();
        assert_eq!(outcome.applied().unwrap().delta, blunt(3));
    }

    #[test]
    fn overheal_is_clamped_at_zero() {
        let mut system = system();
        let entity = EntityId(1);
        system
            .add_damageable(entity, DamageableState::new().with_damage(blunt(3)))
            .unwrap();

        let outcome = system
            .change_damage(entity, blunt(-10), ChangeDamageOptions::default())
            .unwrap();

        assert_eq!(outcome.applied().unwrap().delta, blunt(-3));
        assert_eq!(system.damageable(entity).unwrap().total_damage(), FixedPoint2::ZERO);
    }

    #[test]
    fn irradiate_uses_radiation_types_and_never_interrupts() {
        let mut system = system();
        let entity = EntityId(1);
        system.add_damageable(entity, system.new_state()).unwrap();
        system
            .modifiers()
            .set_modifier(ModifierCategory::AllDamage, 2.0);

        let outcome = system.irradiate(entity, 1.5, None).unwrap();
        let result = outcome.applied().unwrap();

        assert_eq!(result.delta.get("Radiation"), FixedPoint2::new(3));
        assert!(result.damage_increased);
        assert!(!result.interrupts_do_afters);
        assert_eq!(
            system.damageable(entity).unwrap().damage_per_group()["Toxin"],
            FixedPoint2::new(3)
        );
    }

    #[test]
    fn set_all_damage_raises_event_without_delta() {
        let mut system = system();
        let entity = EntityId(1);
        system.add_damageable(entity, DamageableState::new()).unwrap();

        let deltas = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&deltas);
        system.damage_changed().subscribe("record", move |_, event| {
            sink.lock().unwrap().push(event.damage_delta().cloned());
        });

        system.set_all_damage(entity, blunt(40)).unwrap();

        assert_eq!(*deltas.lock().unwrap(), [None]);
        assert_eq!(system.damageable(entity).unwrap().total_damage(), FixedPoint2::new(40));
    }

    #[test]
    fn supported_types_follow_container() {
        let mut system = system();
        system
            .add_damageable(EntityId(1), DamageableState::new().with_container("Biological"))
            .unwrap();
        system.add_damageable(EntityId(2), DamageableState::new()).unwrap();

        let supported = system.supported_types(EntityId(1)).unwrap().unwrap();
        assert_eq!(supported.len(), 4);
        assert!(system.supported_types(EntityId(2)).unwrap().is_none());
        assert!(system.supported_types(EntityId(3)).is_err());
    }

    #[test]
    fn empty_reload_batch_is_a_no_op() {
        let mut system = system();
        let generation = system.taxonomy().generation();
        assert!(!system
            .on_prototypes_reloaded(PrototypeSet::new(), &ReloadBatch::new())
            .unwrap());
        assert_eq!(system.taxonomy().generation(), generation);
        assert!(system.prototypes().container("Biological").is_some());
    }

    #[test]
    fn type_only_reload_keeps_taxonomy() {
        let mut system = system();
        let generation = system.taxonomy().generation();
        let rebuilt = system
            .on_prototypes_reloaded(prototypes(), &ReloadBatch::new().with(PrototypeKind::DamageType))
            .unwrap();
        assert!(!rebuilt);
        assert_eq!(system.taxonomy().generation(), generation);
    }

    #[test]
    fn removal_forgets_equipment_and_thresholds() {
        use crate::{ArmorPiece, EquipmentRelay, MobThresholdTracker};
        use damage_core::SlotFlags;

        let relay = EquipmentRelay::new();
        let tracker = MobThresholdTracker::new();
        let mut system = system()
            .with_relay(relay.clone())
            .with_revive_guard(tracker.clone());
        let entity = EntityId(4);
        system.add_damageable(entity, system.new_state()).unwrap();
        relay.equip(
            entity,
            ArmorPiece::new("helmet", SlotFlags::HEAD, DamageModifierSet::new()),
        );
        tracker.track(
            entity,
            MobThresholdTracker::default_thresholds(),
            FixedPoint2::ZERO,
        );

        assert!(system.remove_damageable(entity).is_some());
        assert!(relay.equipped(entity).is_empty());
        assert_eq!(tracker.state(entity), None);
        assert!(system.remove_damageable(entity).is_none());
    }
}
