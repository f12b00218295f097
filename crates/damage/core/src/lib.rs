//! Deterministic damage model shared by the simulation, tooling, and replicated copies.
//!
//! `damage-core` defines the data that flows through the damage pipeline:
//! fixed-point amounts, damage specifiers, prototype definitions, the derived
//! supported-type index, per-entity damageable state, and the event payloads
//! raised at each pipeline stage. It owns no entity storage and performs no
//! dispatch; the stateful systems live in `damage-runtime`.
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod fixed;
pub mod modifiers;
pub mod prototype;
pub mod resistance;
pub mod slots;
pub mod specifier;
pub mod state;
pub mod taxonomy;

pub use config::DamageConfig;
pub use entity::EntityId;
pub use error::{DamageError, ErrorSeverity};
pub use events::{BeforeDamageChangedEvent, DamageChangedEvent, DamageModifyEvent};
pub use fixed::FixedPoint2;
pub use modifiers::{DamageSource, GlobalModifierSet, ModifierCategory};
pub use prototype::{
    DamageContainerId, DamageContainerPrototype, DamageGroupId, DamageGroupPrototype,
    DamageModifierSetId, DamageModifierSetPrototype, DamageTypeId, DamageTypePrototype,
    PrototypeError, PrototypeKind, PrototypeSet, ReloadBatch,
};
pub use resistance::DamageModifierSet;
pub use slots::SlotFlags;
pub use specifier::DamageSpecifier;
pub use state::{DamageableSnapshot, DamageableState};
pub use taxonomy::{SupportedTypeIndex, TaxonomyCache, TaxonomyError};
