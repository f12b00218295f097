//! Error types surfaced by the damage runtime.
//!
//! Cancellation is not an error; it is reported through
//! [`crate::DamageChangeOutcome::Cancelled`].

use damage_core::{
    DamageContainerId, DamageError, EntityId, ErrorSeverity, PrototypeError, TaxonomyError,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SystemError>;

/// Failures of [`crate::DamageableSystem`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SystemError {
    #[error("entity {0} is not damageable")]
    NotDamageable(EntityId),

    #[error("entity {0} is already damageable")]
    AlreadyDamageable(EntityId),

    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),

    /// A reloaded prototype set failed validation. The previous set stays live.
    #[error("prototype reload rejected: {0}")]
    Prototype(#[from] PrototypeError),

    /// A reload dropped a container that a live entity still uses.
    #[error("prototype reload rejected: entity {entity} still uses removed container '{container}'")]
    ContainerInUse {
        entity: EntityId,
        container: DamageContainerId,
    },
}

impl DamageError for SystemError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotDamageable(_) | Self::AlreadyDamageable(_) => ErrorSeverity::Validation,
            Self::Taxonomy(err) => err.severity(),
            Self::Prototype(_) | Self::ContainerInUse { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotDamageable(_) => "SYSTEM_NOT_DAMAGEABLE",
            Self::AlreadyDamageable(_) => "SYSTEM_ALREADY_DAMAGEABLE",
            Self::Taxonomy(err) => err.error_code(),
            Self::Prototype(err) => err.error_code(),
            Self::ContainerInUse { .. } => "SYSTEM_CONTAINER_IN_USE",
        }
    }
}

/// Failures of [`crate::SettingsStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("unknown setting '{0}'")]
    UnknownSetting(String),

    #[error("setting '{0}' is already registered")]
    DuplicateSetting(String),
}

impl DamageError for SettingsError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSetting(_) => "SETTINGS_UNKNOWN",
            Self::DuplicateSetting(_) => "SETTINGS_DUPLICATE",
        }
    }
}
