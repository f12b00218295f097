//! Live global damage multipliers and the caches derived from them.
//!
//! [`ModifierRegistry`] holds the current [`GlobalModifierSet`]. Changing a
//! value synchronously refreshes every [`ModifierDependent`] that depends on
//! that category before the call returns. The registry never touches the
//! damage pipeline; originating systems call [`ModifierRegistry::scale`] while
//! building the specifier they pass to the engine.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use damage_core::{DamageSource, DamageSpecifier, GlobalModifierSet, ModifierCategory};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::error::SettingsError;
use crate::settings::SettingsStore;

/// A cache whose contents are computed from the global multipliers.
pub trait ModifierDependent: Send {
    fn name(&self) -> &str;

    /// Whether a change to `category` invalidates this cache.
    fn depends_on(&self, category: ModifierCategory) -> bool;

    /// Recomputes the cache from the current multipliers.
    fn refresh(&mut self, modifiers: &GlobalModifierSet);
}

type SharedDependent = Arc<Mutex<dyn ModifierDependent>>;

struct RegistryInner {
    values: GlobalModifierSet,
    dependents: Vec<SharedDependent>,
}

/// Cloneable handle to the live multiplier set.
#[derive(Clone)]
pub struct ModifierRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ModifierRegistry {
    pub fn new() -> Self {
        Self::with_values(GlobalModifierSet::default())
    }

    pub fn with_values(values: GlobalModifierSet) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                values,
                dependents: Vec::new(),
            })),
        }
    }

    /// Current multiplier for `category` (`1.0` until set).
    pub fn get_modifier(&self, category: ModifierCategory) -> f32 {
        lock(&self.inner).values.get(category)
    }

    /// Copy of every current multiplier.
    pub fn modifiers(&self) -> GlobalModifierSet {
        lock(&self.inner).values
    }

    /// Stores `value` and refreshes the dependents of `category` before returning.
    pub fn set_modifier(&self, category: ModifierCategory, value: f32) {
        let (values, affected) = {
            let mut inner = lock(&self.inner);
            inner.values.set(category, value);
            let affected: Vec<SharedDependent> = inner
                .dependents
                .iter()
                .filter(|dependent| lock(dependent).depends_on(category))
                .cloned()
                .collect();
            (inner.values, affected)
        };

        debug!(
            target: "damage::modifiers",
            category = %category,
            value,
            dependents = affected.len(),
            "global modifier updated"
        );

        for dependent in affected {
            lock(&dependent).refresh(&values);
        }
    }

    /// Registers a dependent and fills it from the current multipliers.
    pub fn add_dependent<D>(&self, dependent: Arc<Mutex<D>>)
    where
        D: ModifierDependent + 'static,
    {
        let values = self.modifiers();
        lock(&dependent).refresh(&values);
        lock(&self.inner).dependents.push(dependent);
    }

    pub fn dependent_count(&self) -> usize {
        lock(&self.inner).dependents.len()
    }

    /// Scales `damage` for `source` with the current multipliers.
    pub fn scale(&self, source: DamageSource, damage: &DamageSpecifier) -> DamageSpecifier {
        self.modifiers().scale(source, damage)
    }

    /// Subscribes every category to its setting, seeding values immediately.
    ///
    /// The settings must already be registered, e.g. with
    /// [`register_modifier_settings`].
    pub fn bind(&self, store: &mut SettingsStore) -> Result<(), SettingsError> {
        for category in ModifierCategory::iter() {
            let registry = self.clone();
            store.subscribe(
                category.setting_name(),
                move |value| registry.set_modifier(category, value),
                true,
            )?;
        }
        Ok(())
    }
}

impl Default for ModifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierRegistry")
            .field("values", &self.modifiers())
            .field("dependents", &self.dependent_count())
            .finish()
    }
}

/// Declares one setting per [`ModifierCategory`] with the given initial values.
pub fn register_modifier_settings(
    store: &mut SettingsStore,
    initial: &GlobalModifierSet,
) -> Result<(), SettingsError> {
    for (category, value) in initial.iter() {
        store.register(category.setting_name(), value)?;
    }
    Ok(())
}

/// Named base specifiers and their forms scaled for one [`DamageSource`].
///
/// Serves as the explosion damage map and the reagent guide data.
#[derive(Clone, Debug)]
pub struct ScaledSpecifierCache {
    name: String,
    source: DamageSource,
    depends: Vec<ModifierCategory>,
    modifiers: GlobalModifierSet,
    base: BTreeMap<String, DamageSpecifier>,
    scaled: BTreeMap<String, DamageSpecifier>,
    refreshes: u64,
}

impl ScaledSpecifierCache {
    pub fn new(
        name: impl Into<String>,
        source: DamageSource,
        depends_on: impl IntoIterator<Item = ModifierCategory>,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            depends: depends_on.into_iter().collect(),
            modifiers: GlobalModifierSet::default(),
            base: BTreeMap::new(),
            scaled: BTreeMap::new(),
            refreshes: 0,
        }
    }

    /// Damage per explosion type.
    pub fn explosion_map() -> Self {
        Self::new(
            "explosion_damage",
            DamageSource::Explosion,
            [ModifierCategory::AllDamage, ModifierCategory::Explosion],
        )
    }

    /// Damage and healing per reagent, as shown in the guidebook.
    pub fn reagent_guide() -> Self {
        Self::new(
            "reagent_guide",
            DamageSource::Reagent,
            [
                ModifierCategory::AllDamage,
                ModifierCategory::AllHeal,
                ModifierCategory::ReagentDamage,
                ModifierCategory::ReagentHeal,
            ],
        )
    }

    /// Adds or replaces an entry, scaling it with the last seen multipliers.
    pub fn insert(&mut self, key: impl Into<String>, base: DamageSpecifier) {
        let key = key.into();
        self.scaled
            .insert(key.clone(), self.modifiers.scale(self.source, &base));
        self.base.insert(key, base);
    }

    /// Scaled damage for `key`.
    pub fn get(&self, key: &str) -> Option<&DamageSpecifier> {
        self.scaled.get(key)
    }

    /// Unscaled damage for `key`.
    pub fn base(&self, key: &str) -> Option<&DamageSpecifier> {
        self.base.get(key)
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Number of refreshes received so far.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }
}

impl ModifierDependent for ScaledSpecifierCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn depends_on(&self, category: ModifierCategory) -> bool {
        self.depends.contains(&category)
    }

    fn refresh(&mut self, modifiers: &GlobalModifierSet) {
        self.modifiers = *modifiers;
        self.scaled = self
            .base
            .iter()
            .map(|(key, base)| (key.clone(), modifiers.scale(self.source, base)))
            .collect();
        self.refreshes += 1;
    }
}
