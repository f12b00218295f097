//! Common error infrastructure for damage-core.
//!
//! Domain-specific errors (`PrototypeError`, `TaxonomyError`) are defined next
//! to the data they validate. This module only provides the classification
//! shared by all of them.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the operation can be retried or skipped without harm
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: an inconsistency that indicates a caller bug
/// - **Fatal**: configuration integrity is broken and startup must not continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry or skip.
    ///
    /// Examples: a hot reload that failed while the previous data stays live
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: duplicate prototype id
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: lookup of a container id that was never defined
    Internal,

    /// Fatal error - content cannot be used.
    ///
    /// Examples: a container referencing a group that does not exist
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all damage-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for the Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait DamageError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
