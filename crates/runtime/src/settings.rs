//! Named tunable settings with change callbacks.
//!
//! The store is an explicit object handed to whoever needs it; there is no
//! global settings state. Callbacks run synchronously inside [`SettingsStore::set`],
//! in subscription order, and only when the value actually changes.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::error::SettingsError;

type SettingCallback = Box<dyn FnMut(f32) + Send>;

struct Setting {
    value: f32,
    default: f32,
    callbacks: Vec<SettingCallback>,
}

/// Registry of `f32` settings keyed by name.
#[derive(Default)]
pub struct SettingsStore {
    settings: BTreeMap<String, Setting>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a setting with its initial value.
    pub fn register(&mut self, name: impl Into<String>, default: f32) -> Result<(), SettingsError> {
        let name = name.into();
        if self.settings.contains_key(&name) {
            return Err(SettingsError::DuplicateSetting(name));
        }
        self.settings.insert(
            name,
            Setting {
                value: default,
                default,
                callbacks: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.settings.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<f32, SettingsError> {
        self.settings
            .get(name)
            .map(|setting| setting.value)
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_owned()))
    }

    /// Stores a new value and notifies subscribers if it changed.
    ///
    /// Returns the previous value.
    pub fn set(&mut self, name: &str, value: f32) -> Result<f32, SettingsError> {
        let setting = self
            .settings
            .get_mut(name)
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_owned()))?;

        let previous = std::mem::replace(&mut setting.value, value);
        if previous != value {
            debug!(
                target: "damage::settings",
                setting = name,
                previous,
                value,
                subscribers = setting.callbacks.len(),
                "setting changed"
            );
            for callback in &mut setting.callbacks {
                callback(value);
            }
        }
        Ok(previous)
    }

    /// Restores the registered default value.
    pub fn reset(&mut self, name: &str) -> Result<f32, SettingsError> {
        let default = self
            .settings
            .get(name)
            .map(|setting| setting.default)
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_owned()))?;
        self.set(name, default)
    }

    /// Registers a change callback.
    ///
    /// With `invoke_immediately` the callback also runs once right away with
    /// the current value, which is how subscribers seed their initial state.
    pub fn subscribe<F>(
        &mut self,
        name: &str,
        mut callback: F,
        invoke_immediately: bool,
    ) -> Result<(), SettingsError>
    where
        F: FnMut(f32) + Send + 'static,
    {
        let setting = self
            .settings
            .get_mut(name)
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_owned()))?;

        if invoke_immediately {
            callback(setting.value);
        }
        setting.callbacks.push(Box::new(callback));
        Ok(())
    }

    /// Setting names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.settings.keys().map(String::as_str)
    }
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.settings.iter().map(|(name, setting)| (name, setting.value)))
            .finish()
    }
}
