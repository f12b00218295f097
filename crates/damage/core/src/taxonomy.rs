//! Derived index of the damage types each container accepts.
//!
//! The index flattens container groups into their member types. It is a pure
//! function of the loaded prototypes and is always rebuilt from scratch; a
//! rebuild produces a complete new index that replaces the old one in a single
//! assignment, so readers never see a half-built index.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::error::{DamageError, ErrorSeverity};
use crate::prototype::{DamageContainerId, DamageGroupId, DamageTypeId, PrototypeSet};

static NO_TYPES: BTreeSet<DamageTypeId> = BTreeSet::new();

/// Lookup failures against the taxonomy.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    /// A container id that is not defined was queried.
    #[error("unknown damage container '{0}'")]
    UnknownContainer(DamageContainerId),

    /// A container references a group missing from the prototype set.
    #[error("damage container '{container}' references unknown damage group '{group}'")]
    UnknownGroup {
        container: DamageContainerId,
        group: DamageGroupId,
    },
}

impl DamageError for TaxonomyError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownContainer(_) => ErrorSeverity::Internal,
            Self::UnknownGroup { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownContainer(_) => "TAXONOMY_UNKNOWN_CONTAINER",
            Self::UnknownGroup { .. } => "TAXONOMY_UNKNOWN_GROUP",
        }
    }
}

/// For every container id, the flattened set of accepted damage types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SupportedTypeIndex {
    by_container: BTreeMap<DamageContainerId, BTreeSet<DamageTypeId>>,
}

impl SupportedTypeIndex {
    /// Builds the index from the given definitions.
    ///
    /// Each container maps to its explicit types united with the member types
    /// of every group it references.
    pub fn build(prototypes: &PrototypeSet) -> Result<Self, TaxonomyError> {
        let mut by_container = BTreeMap::new();

        for container in prototypes.containers() {
            let mut set: BTreeSet<DamageTypeId> =
                container.supported_types.iter().cloned().collect();

            for group_id in &container.supported_groups {
                let group = prototypes.group(group_id.as_str()).ok_or_else(|| {
                    TaxonomyError::UnknownGroup {
                        container: container.id.clone(),
                        group: group_id.clone(),
                    }
                })?;
                set.extend(group.damage_types.iter().cloned());
            }

            by_container.insert(container.id.clone(), set);
        }

        Ok(Self { by_container })
    }

    pub fn supported_types(
        &self,
        container: &str,
    ) -> Result<&BTreeSet<DamageTypeId>, TaxonomyError> {
        self.by_container
            .get(container)
            .ok_or_else(|| TaxonomyError::UnknownContainer(container.into()))
    }

    pub fn supports(&self, container: &str, damage_type: &str) -> Result<bool, TaxonomyError> {
        Ok(self.supported_types(container)?.contains(damage_type))
    }

    pub fn containers(&self) -> impl Iterator<Item = &DamageContainerId> {
        self.by_container.keys()
    }

    pub fn len(&self) -> usize {
        self.by_container.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_container.is_empty()
    }
}

/// Published supported-type index with rebuild-and-swap semantics.
///
/// Before the first rebuild every lookup reports "no types supported". After
/// it, unknown container ids are an error. Readers may hold on to a
/// [`TaxonomyCache::snapshot`] while a rebuild publishes a replacement.
#[derive(Clone, Debug, Default)]
pub struct TaxonomyCache {
    index: Option<Arc<SupportedTypeIndex>>,
    generation: u64,
}

impl TaxonomyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the index from scratch and publishes it.
    ///
    /// On error the previously published index stays in place untouched.
    pub fn rebuild(&mut self, prototypes: &PrototypeSet) -> Result<(), TaxonomyError> {
        let index = SupportedTypeIndex::build(prototypes)?;
        self.index = Some(Arc::new(index));
        self.generation += 1;
        Ok(())
    }

    pub fn is_built(&self) -> bool {
        self.index.is_some()
    }

    /// Number of successful rebuilds so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The currently published index, if any.
    pub fn snapshot(&self) -> Option<Arc<SupportedTypeIndex>> {
        self.index.clone()
    }

    pub fn supported_types(
        &self,
        container: &str,
    ) -> Result<&BTreeSet<DamageTypeId>, TaxonomyError> {
        match &self.index {
            Some(index) => index.supported_types(container),
            None => Ok(&NO_TYPES),
        }
    }

    pub fn supports(&self, container: &str, damage_type: &str) -> Result<bool, TaxonomyError> {
        Ok(self.supported_types(container)?.contains(damage_type))
    }
}
