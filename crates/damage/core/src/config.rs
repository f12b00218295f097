use crate::prototype::DamageTypeId;
use crate::state::DEFAULT_RADIATION_TYPE;

/// Damage pipeline configuration and tunable defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DamageConfig {
    /// Damage types that radiation converts into when an entity does not
    /// specify its own.
    pub default_radiation_types: Vec<DamageTypeId>,
    /// Whether every damage change is written to the audit log.
    pub audit_changes: bool,
}

impl DamageConfig {
    pub const DEFAULT_AUDIT_CHANGES: bool = true;

    pub fn new() -> Self {
        Self {
            default_radiation_types: vec![DamageTypeId::from(DEFAULT_RADIATION_TYPE)],
            audit_changes: Self::DEFAULT_AUDIT_CHANGES,
        }
    }
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self::new()
    }
}
