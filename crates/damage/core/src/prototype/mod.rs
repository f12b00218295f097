//! Static damage definitions supplied by the content loader.
//!
//! Prototypes are read-only once loaded. A reload replaces the whole
//! [`PrototypeSet`] and reports which kinds changed through a [`ReloadBatch`],
//! so derived caches can decide whether they need a rebuild.

mod definitions;
mod ids;
mod set;

pub use definitions::{
    DamageContainerPrototype, DamageGroupPrototype, DamageModifierSetPrototype,
    DamageTypePrototype,
};
pub use ids::{DamageContainerId, DamageGroupId, DamageModifierSetId, DamageTypeId};
pub use set::PrototypeSet;

use std::collections::BTreeSet;

use crate::error::{DamageError, ErrorSeverity};

/// Categories of prototypes owned by the damage pipeline.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PrototypeKind {
    DamageType,
    DamageGroup,
    DamageContainer,
    DamageModifierSet,
}

/// The set of prototype kinds touched by a single reload notification.
///
/// One reload may modify many definitions at once; consumers check the batch
/// once and rebuild at most once per batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReloadBatch {
    modified: BTreeSet<PrototypeKind>,
}

impl ReloadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch that marks every kind as modified (initial load, full reload).
    pub fn all() -> Self {
        use strum::IntoEnumIterator;
        Self {
            modified: PrototypeKind::iter().collect(),
        }
    }

    /// Marks a kind as modified (builder pattern).
    #[must_use]
    pub fn with(mut self, kind: PrototypeKind) -> Self {
        self.modified.insert(kind);
        self
    }

    pub fn mark(&mut self, kind: PrototypeKind) {
        self.modified.insert(kind);
    }

    pub fn was_modified(&self, kind: PrototypeKind) -> bool {
        self.modified.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = PrototypeKind> + '_ {
        self.modified.iter().copied()
    }
}

impl FromIterator<PrototypeKind> for ReloadBatch {
    fn from_iter<I: IntoIterator<Item = PrototypeKind>>(iter: I) -> Self {
        Self {
            modified: iter.into_iter().collect(),
        }
    }
}

/// Configuration-integrity errors raised while assembling a [`PrototypeSet`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PrototypeError {
    /// Two definitions of the same kind share an id.
    #[error("duplicate {kind} prototype '{id}'")]
    Duplicate { kind: PrototypeKind, id: String },

    /// A group lists a damage type that is not defined.
    #[error("damage group '{group}' references unknown damage type '{damage_type}'")]
    GroupUnknownType {
        group: DamageGroupId,
        damage_type: DamageTypeId,
    },

    /// A container lists a damage type that is not defined.
    #[error("damage container '{container}' references unknown damage type '{damage_type}'")]
    ContainerUnknownType {
        container: DamageContainerId,
        damage_type: DamageTypeId,
    },

    /// A container lists a damage group that is not defined.
    #[error("damage container '{container}' references unknown damage group '{group}'")]
    ContainerUnknownGroup {
        container: DamageContainerId,
        group: DamageGroupId,
    },

    /// A modifier set names a damage type that is not defined.
    #[error("damage modifier set '{set}' references unknown damage type '{damage_type}'")]
    ModifierSetUnknownType {
        set: DamageModifierSetId,
        damage_type: DamageTypeId,
    },
}

impl DamageError for PrototypeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Duplicate { .. } => ErrorSeverity::Validation,
            _ => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Duplicate { .. } => "PROTOTYPE_DUPLICATE",
            Self::GroupUnknownType { .. } => "PROTOTYPE_GROUP_UNKNOWN_TYPE",
            Self::ContainerUnknownType { .. } => "PROTOTYPE_CONTAINER_UNKNOWN_TYPE",
            Self::ContainerUnknownGroup { .. } => "PROTOTYPE_CONTAINER_UNKNOWN_GROUP",
            Self::ModifierSetUnknownType { .. } => "PROTOTYPE_MODIFIER_SET_UNKNOWN_TYPE",
        }
    }
}
