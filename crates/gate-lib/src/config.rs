//! Gate configuration
//!
//! Loaded from an optional TOML/JSON file, then `GATE_*` environment
//! variables (e.g. `GATE_UNKNOWN_KIND_POLICY=reject`).

use crate::error::{GateError, RegistryError};
use crate::flatten::DEFAULT_SEPARATOR;
use crate::gate::{Gate, UnknownKindPolicy};
use crate::observability::{DiagnosticSink, GateMetrics};
use crate::registry::{ReadinessRegistry, RegistryEntry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Gate configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Handling of trainable objects with no registered evidence attribute
    #[serde(default)]
    pub unknown_kind_policy: UnknownKindPolicy,

    /// Kinds registered after the built-in ones, in order
    #[serde(default)]
    pub extra_kinds: Vec<RegistryEntry>,

    /// Separator for flattened keys
    #[serde(default = "default_flatten_separator")]
    pub flatten_separator: String,

    /// Component name attached to tracing diagnostics
    #[serde(default = "default_component")]
    pub component: String,

    /// Record gate metrics
    #[serde(default)]
    pub metrics_enabled: bool,
}

fn default_flatten_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_component() -> String {
    "readiness_gate".to_string()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            unknown_kind_policy: UnknownKindPolicy::default(),
            extra_kinds: Vec::new(),
            flatten_separator: default_flatten_separator(),
            component: default_component(),
            metrics_enabled: false,
        }
    }
}

impl GateConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, GateError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let config = builder
            .add_source(config::Environment::with_prefix("GATE"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Built-in registry followed by `extra_kinds`
    pub fn build_registry(&self) -> Result<ReadinessRegistry, RegistryError> {
        let mut registry = ReadinessRegistry::with_defaults();
        for entry in &self.extra_kinds {
            registry.register(entry.kind.clone(), entry.evidence.clone())?;
        }
        Ok(registry)
    }

    /// Assemble a gate reporting to `sink`
    pub fn build_gate(&self, sink: Arc<dyn DiagnosticSink>) -> Result<Gate, GateError> {
        let mut builder = Gate::builder()
            .registry(self.build_registry()?)
            .unknown_kind_policy(self.unknown_kind_policy)
            .sink(sink);
        if self.metrics_enabled {
            builder = builder.metrics(GateMetrics::new()?);
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CapabilityKind, EstimatorSnapshot, EvidenceAttribute};
    use crate::observability::MemorySink;
    use std::io::Write;

    fn write_config(extension: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(extension)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = GateConfig::default();

        assert_eq!(config.unknown_kind_policy, UnknownKindPolicy::AssumeReady);
        assert_eq!(config.flatten_separator, ".");
        assert!(config.extra_kinds.is_empty());
        assert!(!config.metrics_enabled);
    }

    #[test]
    fn test_load_toml_file() {
        let file = write_config(
            ".toml",
            r#"
unknown_kind_policy = "reject"
flatten_separator = "/"
metrics_enabled = true

[[extra_kinds]]
kind = "naive_bayes"
evidence = "class_prior_"
"#,
        );

        let config = GateConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.unknown_kind_policy, UnknownKindPolicy::Reject);
        assert_eq!(config.flatten_separator, "/");
        assert!(config.metrics_enabled);
        assert_eq!(
            config.extra_kinds,
            vec![RegistryEntry {
                kind: CapabilityKind::new("naive_bayes"),
                evidence: EvidenceAttribute::new("class_prior_"),
            }]
        );
    }

    #[test]
    fn test_load_json_file_keeps_missing_defaults() {
        let file = write_config(".json", r#"{ "component": "scoring" }"#);

        let config = GateConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.component, "scoring");
        assert_eq!(config.flatten_separator, ".");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = GateConfig::load(Some(Path::new("/nonexistent/gate.toml")));

        assert!(matches!(result, Err(GateError::Config(_))));
    }

    // Only test that touches `GATE_*`; the values agree with the other load tests
    #[test]
    fn test_environment_overrides_file() {
        let file = write_config(
            ".toml",
            "unknown_kind_policy = \"assume_ready\"\nmetrics_enabled = false\n",
        );
        std::env::set_var("GATE_UNKNOWN_KIND_POLICY", "reject");
        std::env::set_var("GATE_METRICS_ENABLED", "true");

        let from_env = GateConfig::load(None);
        let layered = GateConfig::load(Some(file.path()));

        std::env::remove_var("GATE_UNKNOWN_KIND_POLICY");
        std::env::remove_var("GATE_METRICS_ENABLED");

        let from_env = from_env.unwrap();
        assert_eq!(from_env.unknown_kind_policy, UnknownKindPolicy::Reject);
        assert!(from_env.metrics_enabled);

        let layered = layered.unwrap();
        assert_eq!(layered.unknown_kind_policy, UnknownKindPolicy::Reject);
        assert!(layered.metrics_enabled);

        let gate = layered.build_gate(Arc::new(MemorySink::new())).unwrap();
        let outcome = gate.call(&EstimatorSnapshot::new("X"), |_| ());
        assert_eq!(
            outcome.rejection(),
            Some(&crate::gate::Rejection::UnknownKind {
                type_label: "X".to_string()
            })
        );
    }

    #[test]
    fn test_extra_kinds_extend_registry() {
        let config = GateConfig {
            extra_kinds: vec![RegistryEntry {
                kind: CapabilityKind::new("naive_bayes"),
                evidence: EvidenceAttribute::new("class_prior_"),
            }],
            ..GateConfig::default()
        };

        let registry = config.build_registry().unwrap();

        assert_eq!(registry.len(), 6);
        assert_eq!(registry.entries()[5].kind.as_str(), "naive_bayes");
    }

    #[test]
    fn test_duplicate_extra_kind_fails() {
        let config = GateConfig {
            extra_kinds: vec![RegistryEntry {
                kind: CapabilityKind::SINGLE_TREE,
                evidence: EvidenceAttribute::new("root_"),
            }],
            ..GateConfig::default()
        };

        let result = config.build_gate(Arc::new(MemorySink::new()));

        assert!(matches!(result, Err(GateError::Registry(_))));
    }

    #[test]
    fn test_build_gate_applies_policy_and_metrics() {
        let config = GateConfig {
            unknown_kind_policy: UnknownKindPolicy::Reject,
            metrics_enabled: true,
            ..GateConfig::default()
        };

        let gate = config.build_gate(Arc::new(MemorySink::new())).unwrap();
        let outcome = gate.call(&EstimatorSnapshot::new("GaussianNB"), |_| ());

        assert!(outcome.is_rejected());
        assert_eq!(gate.metrics().unwrap().rejected_total("unknown_kind"), 1);
    }
}
