//! Scripted damage session over the bundled content.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use damage_content::ContentFactory;
use damage_core::{
    DamageSource, DamageSpecifier, EntityId, FixedPoint2, ModifierCategory, SlotFlags,
};
use damage_runtime::{
    ArmorPiece, ChangeDamageOptions, DamageableSystem, EquipmentRelay, MobState,
    MobThresholdTracker, ModifierRegistry, ScaledSpecifierCache, SettingsStore,
    register_modifier_settings,
};
use tracing::{debug, info};

const CREWMAN: EntityId = EntityId(1);
const BORG: EntityId = EntityId(2);

/// Final state of one simulated entity.
#[derive(Clone, Debug)]
pub struct EntityReport {
    pub entity: EntityId,
    pub label: &'static str,
    pub damage: DamageSpecifier,
    pub total_damage: FixedPoint2,
    pub mob_state: Option<MobState>,
}

/// Outcome of [`Session::run`].
#[derive(Clone, Debug)]
pub struct SessionReport {
    pub entities: Vec<EntityReport>,
    pub revives: usize,
}

/// Fully wired systems ready to run the script.
pub struct Session {
    system: DamageableSystem,
    settings: SettingsStore,
    modifiers: ModifierRegistry,
    explosions: Arc<Mutex<ScaledSpecifierCache>>,
    relay: EquipmentRelay,
    thresholds: MobThresholdTracker,
}

impl Session {
    /// Loads content and assembles the systems.
    pub fn load(config: &crate::SimConfig) -> Result<Self> {
        let factory = ContentFactory::new(&config.data_dir);

        let mut damage_config = factory.load_config().context("loading config.toml")?;
        if let Some(audit) = config.audit {
            damage_config.audit_changes = audit;
        }
        let tunables = factory.load_tunables().context("loading tunables.toml")?;
        let prototypes = factory
            .load_prototypes()
            .context("loading damage prototypes")?;

        let mut settings = SettingsStore::new();
        register_modifier_settings(&mut settings, &tunables.to_modifier_set())?;

        let modifiers = ModifierRegistry::new();
        let explosions = Arc::new(Mutex::new(ScaledSpecifierCache::explosion_map()));
        {
            let mut map = explosions.lock().unwrap_or_else(PoisonError::into_inner);
            map.insert("Default", spec(&[("Blunt", 10), ("Heat", 10)]));
            map.insert("Minibomb", spec(&[("Blunt", 40), ("Heat", 30)]));
        }
        modifiers.add_dependent(Arc::clone(&explosions));
        modifiers.bind(&mut settings)?;

        let relay = EquipmentRelay::new();
        let thresholds = MobThresholdTracker::new();

        let mut system = DamageableSystem::new(prototypes, damage_config)?
            .with_modifiers(modifiers.clone())
            .with_relay(relay.clone())
            .with_revive_guard(thresholds.clone());
        system
            .damage_changed()
            .subscribe("mob_thresholds", thresholds.listener());

        Ok(Self {
            system,
            settings,
            modifiers,
            explosions,
            relay,
            thresholds,
        })
    }

    fn spawn(&mut self) -> Result<()> {
        let crewman = self.system.new_state().with_container("Biological");
        self.system.add_damageable(CREWMAN, crewman)?;
        self.thresholds.track(
            CREWMAN,
            MobThresholdTracker::default_thresholds(),
            FixedPoint2::ZERO,
        );

        if let Some(vest) = self.system.prototypes().modifier_set("ArmorVest") {
            self.relay.equip(
                CREWMAN,
                ArmorPiece::new("armor vest", SlotFlags::OUTERCLOTHING, vest.modifiers.clone()),
            );
        }

        let borg = self
            .system
            .new_state()
            .with_container("Silicon")
            .with_modifier_set("Metallic");
        self.system.add_damageable(BORG, borg)?;
        self.thresholds.track(
            BORG,
            [
                (FixedPoint2::ZERO, MobState::Alive),
                (FixedPoint2::new(200), MobState::Dead),
            ],
            FixedPoint2::ZERO,
        );
        Ok(())
    }

    fn explode(&mut self, kind: &str, targets: &[EntityId]) -> Result<()> {
        let damage = self
            .explosions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(kind)
            .cloned()
            .with_context(|| format!("unknown explosion type {kind}"))?;

        for &target in targets {
            // keep only what the target's container accepts
            let damage = match self.system.supported_types(target)? {
                Some(supported) => damage.filtered(|ty| supported.contains(ty)),
                None => damage.clone(),
            };
            self.system
                .change_damage(target, damage, ChangeDamageOptions::default())?;
        }
        Ok(())
    }

    /// Runs the script and reports the final state.
    pub fn run(&mut self) -> Result<SessionReport> {
        self.spawn()?;

        info!("Crewman is struck in melee");
        let punch = self
            .modifiers
            .scale(DamageSource::Melee, &spec(&[("Blunt", 15)]));
        self.system
            .change_damage(CREWMAN, punch, ChangeDamageOptions::default().with_origin(BORG))?;

        info!("A bomb goes off");
        self.explode("Default", &[CREWMAN, BORG])?;

        info!("Crewman walks through a radiation leak");
        self.system.irradiate(CREWMAN, 7.5, None)?;

        info!("Crewman takes a brute pack");
        let brute_pack = self
            .modifiers
            .scale(DamageSource::Topical, &spec(&[("Blunt", -10), ("Slash", -10)]));
        self.system
            .change_damage(CREWMAN, brute_pack, ChangeDamageOptions::default())?;

        info!("Explosions are tuned up");
        self.settings
            .set(ModifierCategory::Explosion.setting_name(), 4.0)?;
        self.explode("Minibomb", &[CREWMAN, BORG])?;

        info!("Medbay rejuvenates the crewman");
        self.system.rejuvenate(CREWMAN)?;

        let revives = self
            .thresholds
            .transitions(CREWMAN)
            .iter()
            .filter(|transition| transition.from == MobState::Dead)
            .count();
        debug!(revives, "session finished");

        let entities = [(CREWMAN, "crewman"), (BORG, "borg")]
            .into_iter()
            .filter_map(|(entity, label)| {
                let state = self.system.damageable(entity)?;
                Some(EntityReport {
                    entity,
                    label,
                    damage: state.damage().clone(),
                    total_damage: state.total_damage(),
                    mob_state: self.thresholds.state(entity),
                })
            })
            .collect();

        Ok(SessionReport { entities, revives })
    }
}

fn spec(entries: &[(&str, i32)]) -> DamageSpecifier {
    entries
        .iter()
        .map(|&(damage_type, amount)| (damage_type.into(), FixedPoint2::new(amount)))
        .collect()
}
