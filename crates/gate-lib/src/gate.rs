//! Readiness gate
//!
//! Wraps calls whose leading argument is a trainable object. A call is only
//! delegated when the object is trainable at all and, if its kind is known
//! to the registry, carries the kind's evidence attribute. Otherwise the gate
//! reports a diagnostic and returns [`GateOutcome::Rejected`] without running
//! the wrapped function.

use crate::models::{CapabilityKind, EvidenceAttribute, Subject};
use crate::observability::{
    Diagnostic, DiagnosticEvent, DiagnosticSink, GateMetrics, Severity, TracingSink,
};
use crate::registry::ReadinessRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// What to do with trainable objects whose kind has no registered evidence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKindPolicy {
    /// Delegate anyway; readiness cannot be verified
    #[default]
    AssumeReady,
    /// Refuse to delegate
    Reject,
}

/// Reason the gate refused a call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{type_label} is not a recognized trainable object")]
    NotTrainable { type_label: String },

    #[error(
        "model of type {type_label} ({kind}) does not have the required attribute '{attribute}', likely not trained"
    )]
    MissingEvidence {
        type_label: String,
        kind: CapabilityKind,
        attribute: EvidenceAttribute,
    },

    #[error("{type_label} does not belong to any registered capability kind")]
    UnknownKind { type_label: String },
}

impl Rejection {
    /// Stable tag for metric labels and machine-readable output
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::NotTrainable { .. } => "not_trainable",
            Rejection::MissingEvidence { .. } => "missing_evidence",
            Rejection::UnknownKind { .. } => "unknown_kind",
        }
    }
}

/// Result of a successful readiness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// The evidence attribute for the object's kind is present
    Verified {
        kind: CapabilityKind,
        evidence: EvidenceAttribute,
    },
    /// Kind unknown to the registry, allowed through by policy
    Unverified,
}

/// Outcome of a gated call
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum GateOutcome<R> {
    Delegated(R),
    Rejected(Rejection),
}

impl<R> GateOutcome<R> {
    pub fn is_delegated(&self) -> bool {
        matches!(self, GateOutcome::Delegated(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, GateOutcome::Rejected(_))
    }

    /// Value returned by the wrapped function, if it ran
    pub fn delegated(self) -> Option<R> {
        match self {
            GateOutcome::Delegated(value) => Some(value),
            GateOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            GateOutcome::Delegated(_) => None,
            GateOutcome::Rejected(rejection) => Some(rejection),
        }
    }

    pub fn into_result(self) -> Result<R, Rejection> {
        match self {
            GateOutcome::Delegated(value) => Ok(value),
            GateOutcome::Rejected(rejection) => Err(rejection),
        }
    }

    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> GateOutcome<T> {
        match self {
            GateOutcome::Delegated(value) => GateOutcome::Delegated(f(value)),
            GateOutcome::Rejected(rejection) => GateOutcome::Rejected(rejection),
        }
    }
}

/// Builder for [`Gate`]
pub struct GateBuilder {
    registry: Arc<ReadinessRegistry>,
    policy: UnknownKindPolicy,
    sink: Arc<dyn DiagnosticSink>,
    metrics: Option<GateMetrics>,
}

impl Default for GateBuilder {
    fn default() -> Self {
        Self {
            registry: ReadinessRegistry::global(),
            policy: UnknownKindPolicy::default(),
            sink: Arc::new(TracingSink::default()),
            metrics: None,
        }
    }
}

impl GateBuilder {
    pub fn registry(mut self, registry: impl Into<Arc<ReadinessRegistry>>) -> Self {
        self.registry = registry.into();
        self
    }

    pub fn unknown_kind_policy(mut self, policy: UnknownKindPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn metrics(mut self, metrics: GateMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Gate {
        Gate {
            registry: self.registry,
            policy: self.policy,
            sink: self.sink,
            metrics: self.metrics,
        }
    }
}

/// Guard that enforces readiness before delegating a call
#[derive(Clone)]
pub struct Gate {
    registry: Arc<ReadinessRegistry>,
    policy: UnknownKindPolicy,
    sink: Arc<dyn DiagnosticSink>,
    metrics: Option<GateMetrics>,
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl Gate {
    /// Create a gate with the default unknown-kind policy and no metrics
    pub fn new(
        registry: impl Into<Arc<ReadinessRegistry>>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self::builder().registry(registry).sink(sink).build()
    }

    pub fn builder() -> GateBuilder {
        GateBuilder::default()
    }

    pub fn registry(&self) -> &ReadinessRegistry {
        &self.registry
    }

    pub fn unknown_kind_policy(&self) -> UnknownKindPolicy {
        self.policy
    }

    pub fn metrics(&self) -> Option<&GateMetrics> {
        self.metrics.as_ref()
    }

    /// Run the capability and evidence checks without delegating anything
    pub fn check<S: Subject + ?Sized>(&self, subject: &S) -> Result<Readiness, Rejection> {
        let Some(trainable) = subject.as_trainable() else {
            return Err(self.reject(Rejection::NotTrainable {
                type_label: subject.type_label().into_owned(),
            }));
        };

        let Some(entry) = self.registry.lookup_evidence_attribute(trainable) else {
            return match self.policy {
                UnknownKindPolicy::AssumeReady => {
                    let type_label = subject.type_label();
                    let message =
                        format!("{type_label} has no registered evidence attribute, delegating");
                    self.sink.emit(Diagnostic::new(
                        DiagnosticEvent::GateUnverified,
                        Severity::Debug,
                        &*type_label,
                        message,
                    ));
                    Ok(Readiness::Unverified)
                }
                UnknownKindPolicy::Reject => Err(self.reject(Rejection::UnknownKind {
                    type_label: subject.type_label().into_owned(),
                })),
            };
        };

        if !trainable.has_attribute(&entry.evidence) {
            return Err(self.reject(Rejection::MissingEvidence {
                type_label: subject.type_label().into_owned(),
                kind: entry.kind.clone(),
                attribute: entry.evidence.clone(),
            }));
        }

        Ok(Readiness::Verified {
            kind: entry.kind.clone(),
            evidence: entry.evidence.clone(),
        })
    }

    /// Check the subject and, if ready, call `f` with it exactly once
    pub fn call<S, R, F>(&self, subject: &S, f: F) -> GateOutcome<R>
    where
        S: Subject + ?Sized,
        F: FnOnce(&S) -> R,
    {
        self.call_with_readiness(subject, |subject, _| f(subject))
    }

    /// Like [`Gate::call`], also handing `f` the readiness the check established
    pub fn call_with_readiness<S, R, F>(&self, subject: &S, f: F) -> GateOutcome<R>
    where
        S: Subject + ?Sized,
        F: FnOnce(&S, &Readiness) -> R,
    {
        let readiness = match self.check(subject) {
            Ok(readiness) => readiness,
            Err(rejection) => return GateOutcome::Rejected(rejection),
        };

        let start = Instant::now();
        let value = f(subject, &readiness);
        if let Some(metrics) = &self.metrics {
            metrics.inc_delegated();
            metrics.observe_call_duration(start.elapsed().as_secs_f64());
        }
        GateOutcome::Delegated(value)
    }

    /// Wrap `f` into a reusable guarded function
    pub fn guard<F>(&self, f: F) -> Guarded<F> {
        Guarded {
            gate: self.clone(),
            func: f,
        }
    }

    fn reject(&self, rejection: Rejection) -> Rejection {
        let target = match &rejection {
            Rejection::NotTrainable { type_label }
            | Rejection::MissingEvidence { type_label, .. }
            | Rejection::UnknownKind { type_label } => type_label.clone(),
        };
        self.sink.emit(Diagnostic::new(
            DiagnosticEvent::GateRejected,
            Severity::Warn,
            target,
            format!("{rejection}, aborting"),
        ));
        if let Some(metrics) = &self.metrics {
            metrics.inc_rejected(rejection.reason());
        }
        rejection
    }
}

/// A function whose calls go through a [`Gate`]
#[derive(Clone)]
pub struct Guarded<F> {
    gate: Gate,
    func: F,
}

impl<F> Guarded<F> {
    /// Call the wrapped function with `subject` and the remaining arguments unchanged
    pub fn call<S, A, R>(&self, subject: &S, args: A) -> GateOutcome<R>
    where
        S: Subject + ?Sized,
        F: Fn(&S, A) -> R,
    {
        self.gate.call(subject, |subject| (self.func)(subject, args))
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }
}
