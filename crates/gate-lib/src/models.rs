//! Core data models for trainable objects

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Family of trainable objects sharing the same readiness rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityKind(Cow<'static, str>);

impl CapabilityKind {
    pub const LINEAR_COEFFICIENT: Self = Self(Cow::Borrowed("linear_coefficient"));
    pub const TREE_ENSEMBLE: Self = Self(Cow::Borrowed("tree_ensemble"));
    pub const SINGLE_TREE: Self = Self(Cow::Borrowed("single_tree"));
    pub const MARGIN_CLASSIFIER: Self = Self(Cow::Borrowed("margin_classifier"));
    pub const INSTANCE_BASED: Self = Self(Cow::Borrowed("instance_based"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a field that only exists once training has completed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceAttribute(Cow<'static, str>);

impl EvidenceAttribute {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EvidenceAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability interface of a trainable object
pub trait Trainable {
    /// Whether the object belongs to the given family (an object may belong to several)
    fn satisfies(&self, kind: &CapabilityKind) -> bool;

    /// Whether the named attribute is currently populated
    fn has_attribute(&self, attribute: &EvidenceAttribute) -> bool;
}

/// Anything that can be handed to the gate as its leading argument
pub trait Subject {
    /// Runtime type name used in diagnostics
    fn type_label(&self) -> Cow<'_, str>;

    /// Base capability check; `None` means the value is not a trainable object at all
    fn as_trainable(&self) -> Option<&dyn Trainable>;
}

impl Subject for str {
    fn type_label(&self) -> Cow<'_, str> {
        Cow::Borrowed("str")
    }

    fn as_trainable(&self) -> Option<&dyn Trainable> {
        None
    }
}

impl Subject for String {
    fn type_label(&self) -> Cow<'_, str> {
        Cow::Borrowed("String")
    }

    fn as_trainable(&self) -> Option<&dyn Trainable> {
        None
    }
}

impl Subject for Value {
    fn type_label(&self) -> Cow<'_, str> {
        let label = match self {
            Value::Null => "json null",
            Value::Bool(_) => "json bool",
            Value::Number(_) => "json number",
            Value::String(_) => "json string",
            Value::Array(_) => "json array",
            Value::Object(_) => "json object",
        };
        Cow::Borrowed(label)
    }

    fn as_trainable(&self) -> Option<&dyn Trainable> {
        None
    }
}

/// Exported description of an estimator and its fitted attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorSnapshot {
    /// Estimator type name, e.g. `LogisticRegression`
    pub estimator: String,
    #[serde(default)]
    pub capabilities: Vec<CapabilityKind>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EstimatorSnapshot {
    pub fn new(estimator: impl Into<String>) -> Self {
        Self {
            estimator: estimator.into(),
            capabilities: Vec::new(),
            attributes: Map::new(),
        }
    }

    pub fn with_capability(mut self, kind: CapabilityKind) -> Self {
        self.capabilities.push(kind);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    /// Names of populated attributes
    pub fn populated_attributes(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl Trainable for EstimatorSnapshot {
    fn satisfies(&self, kind: &CapabilityKind) -> bool {
        self.capabilities.contains(kind)
    }

    // A null attribute is how exporters write "declared but never fitted"
    fn has_attribute(&self, attribute: &EvidenceAttribute) -> bool {
        self.attributes
            .get(attribute.as_str())
            .is_some_and(|value| !value.is_null())
    }
}

impl Subject for EstimatorSnapshot {
    fn type_label(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.estimator.as_str())
    }

    fn as_trainable(&self) -> Option<&dyn Trainable> {
        Some(self)
    }
}
