//! Readiness registry
//!
//! Maps capability kinds to the evidence attribute that proves an object of
//! that kind finished training. Lookup walks the entries in registration
//! order and stops at the first kind the object satisfies, so earlier
//! registrations win when an object belongs to several families.

use crate::error::RegistryError;
use crate::models::{CapabilityKind, EvidenceAttribute, Trainable};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Process-wide default registry (built once)
static GLOBAL_REGISTRY: OnceLock<Arc<ReadinessRegistry>> = OnceLock::new();

/// Built-in kinds in precedence order
const DEFAULT_ENTRIES: &[(CapabilityKind, EvidenceAttribute)] = &[
    (
        CapabilityKind::LINEAR_COEFFICIENT,
        EvidenceAttribute::from_static("coef_"),
    ),
    (
        CapabilityKind::TREE_ENSEMBLE,
        EvidenceAttribute::from_static("feature_importances_"),
    ),
    (
        CapabilityKind::SINGLE_TREE,
        EvidenceAttribute::from_static("tree_"),
    ),
    (
        CapabilityKind::MARGIN_CLASSIFIER,
        EvidenceAttribute::from_static("support_"),
    ),
    (
        CapabilityKind::INSTANCE_BASED,
        EvidenceAttribute::from_static("_fit_X"),
    ),
];

/// A single kind → evidence mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub kind: CapabilityKind,
    pub evidence: EvidenceAttribute,
}

/// Ordered mapping from capability kind to evidence attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for ReadinessRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ReadinessRegistry {
    /// Create a registry with no entries
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create a registry with the built-in estimator families
    pub fn with_defaults() -> Self {
        Self {
            entries: DEFAULT_ENTRIES
                .iter()
                .map(|(kind, evidence)| RegistryEntry {
                    kind: kind.clone(),
                    evidence: evidence.clone(),
                })
                .collect(),
        }
    }

    /// Shared default registry, used by gates built without an explicit one
    pub fn global() -> Arc<ReadinessRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(Self::with_defaults()))
            .clone()
    }

    /// Append a kind after all existing entries
    pub fn register(
        &mut self,
        kind: CapabilityKind,
        evidence: EvidenceAttribute,
    ) -> Result<(), RegistryError> {
        if self.entries.iter().any(|entry| entry.kind == kind) {
            return Err(RegistryError::DuplicateKind { kind });
        }
        self.entries.push(RegistryEntry { kind, evidence });
        Ok(())
    }

    /// Find the evidence attribute for an object, or `None` for an unknown kind
    pub fn lookup_evidence_attribute(&self, object: &dyn Trainable) -> Option<&RegistryEntry> {
        self.entries.iter().find(|entry| object.satisfies(&entry.kind))
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
