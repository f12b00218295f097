//! Stateful damage systems built on `damage-core`.
//!
//! Modules are organized by responsibility:
//! - [`system`] hosts the damage application engine and lifecycle hooks
//! - [`listeners`] provides ordered per-stage listener registries
//! - [`relay`] routes the modify stage to equipped armour
//! - [`settings`] and [`modifiers`] keep the live global multipliers
//! - [`thresholds`] tracks mob states and owns the revive guard
//! - [`audit`] logs applied changes
pub mod audit;
pub mod error;
pub mod listeners;
pub mod modifiers;
pub mod relay;
pub mod settings;
pub mod system;
pub mod thresholds;

pub use audit::{audit_listener, render_delta};
pub use error::{Result, SettingsError, SystemError};
pub use listeners::{ChangedListeners, ListenerId, ListenerRegistry};
pub use modifiers::{
    ModifierDependent, ModifierRegistry, ScaledSpecifierCache, register_modifier_settings,
};
pub use relay::{ArmorPiece, EquipmentRelay, InventoryRelay};
pub use settings::SettingsStore;
pub use system::{ChangeDamageOptions, DamageChangeOutcome, DamageChangeResult, DamageableSystem};
pub use thresholds::{MobState, MobThresholdTracker, MobTransition, ReviveGuard};
