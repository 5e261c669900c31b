//! Observability infrastructure for the readiness gate
//!
//! Provides:
//! - Diagnostic events and the sink trait the gate and wrappers report through
//! - A tracing-backed sink for structured logging and an in-memory sink
//! - Prometheus metrics (delegations, rejections by reason, call latency)

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Kind of event a diagnostic reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticEvent {
    /// The gate refused to delegate a call
    GateRejected,
    /// The gate delegated without being able to verify readiness
    GateUnverified,
    /// A timed call finished
    CallTimed,
    /// A failure was swallowed by the catching wrapper
    FailureCaught,
    /// Arguments were logged before a call
    ArgumentsLogged,
}

impl DiagnosticEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticEvent::GateRejected => "gate_rejected",
            DiagnosticEvent::GateUnverified => "gate_unverified",
            DiagnosticEvent::CallTimed => "call_timed",
            DiagnosticEvent::FailureCaught => "failure_caught",
            DiagnosticEvent::ArgumentsLogged => "arguments_logged",
        }
    }
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
}

/// Human-readable report emitted by the gate or a wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub event: DiagnosticEvent,
    pub severity: Severity,
    /// Type label of the subject or name of the wrapped call
    pub target: String,
    pub message: String,
    pub emitted_at: i64,
}

impl Diagnostic {
    pub fn new(
        event: DiagnosticEvent,
        severity: Severity,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            event,
            severity,
            target: target.into(),
            message: message.into(),
            emitted_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Destination for diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Sink that forwards diagnostics to `tracing`
#[derive(Debug, Clone)]
pub struct TracingSink {
    component: String,
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new("readiness_gate")
    }
}

impl TracingSink {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warn => {
                warn!(
                    event = %diagnostic.event,
                    component = %self.component,
                    subject = %diagnostic.target,
                    "{}",
                    diagnostic.message
                );
            }
            Severity::Info => {
                info!(
                    event = %diagnostic.event,
                    component = %self.component,
                    subject = %diagnostic.target,
                    "{}",
                    diagnostic.message
                );
            }
            Severity::Debug => {
                debug!(
                    event = %diagnostic.event,
                    component = %self.component,
                    subject = %diagnostic.target,
                    "{}",
                    diagnostic.message
                );
            }
        }
    }
}

/// Sink that keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn records(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }
}

/// Gate metrics for Prometheus exposition
///
/// Metrics live on an owned registry so several gates (and tests) can
/// coexist in one process. Clones share the same underlying counters.
#[derive(Clone)]
pub struct GateMetrics {
    registry: Registry,
    delegated: IntCounter,
    rejected: IntCounterVec,
    call_duration_seconds: Histogram,
}

impl fmt::Debug for GateMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateMetrics")
            .field("delegated", &self.delegated.get())
            .finish_non_exhaustive()
    }
}

impl GateMetrics {
    /// Create and register the gate metrics
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let delegated = IntCounter::new(
            "readiness_gate_delegated_total",
            "Calls forwarded to the wrapped function",
        )?;
        let rejected = IntCounterVec::new(
            Opts::new(
                "readiness_gate_rejected_total",
                "Calls short-circuited by the gate",
            ),
            &["reason"],
        )?;
        let call_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "readiness_gate_call_duration_seconds",
                "Time spent inside delegated calls",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
        )?;

        registry.register(Box::new(delegated.clone()))?;
        registry.register(Box::new(rejected.clone()))?;
        registry.register(Box::new(call_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            delegated,
            rejected,
            call_duration_seconds,
        })
    }

    /// Increment delegated calls counter
    pub fn inc_delegated(&self) {
        self.delegated.inc();
    }

    /// Increment rejected calls counter for a reason
    pub fn inc_rejected(&self, reason: &str) {
        self.rejected.with_label_values(&[reason]).inc();
    }

    /// Record a delegated call latency observation
    pub fn observe_call_duration(&self, duration_secs: f64) {
        self.call_duration_seconds.observe(duration_secs);
    }

    pub fn delegated_total(&self) -> u64 {
        self.delegated.get()
    }

    pub fn rejected_total(&self, reason: &str) -> u64 {
        self.rejected.with_label_values(&[reason]).get()
    }

    pub fn observed_calls(&self) -> u64 {
        self.call_duration_seconds.get_sample_count()
    }

    /// Render all gate metrics in the Prometheus text format
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_in_order() {
        let sink = MemorySink::new();
        sink.emit(Diagnostic::new(
            DiagnosticEvent::CallTimed,
            Severity::Info,
            "first",
            "one",
        ));
        sink.emit(Diagnostic::new(
            DiagnosticEvent::FailureCaught,
            Severity::Warn,
            "second",
            "two",
        ));

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].target, "first");
        assert_eq!(records[1].event, DiagnosticEvent::FailureCaught);

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_tracing_sink_accepts_every_severity() {
        let sink = TracingSink::new("test-component");
        assert_eq!(sink.component(), "test-component");

        for severity in [Severity::Debug, Severity::Info, Severity::Warn] {
            sink.emit(Diagnostic::new(
                DiagnosticEvent::GateRejected,
                severity,
                "target",
                "message",
            ));
        }
    }

    #[test]
    fn test_gate_metrics_are_independent_per_instance() {
        let a = GateMetrics::new().unwrap();
        let b = GateMetrics::new().unwrap();

        a.inc_delegated();
        a.inc_rejected("missing_evidence");
        a.inc_rejected("missing_evidence");
        a.observe_call_duration(0.002);

        assert_eq!(a.delegated_total(), 1);
        assert_eq!(a.rejected_total("missing_evidence"), 2);
        assert_eq!(a.observed_calls(), 1);
        assert_eq!(b.delegated_total(), 0);
    }

    #[test]
    fn test_gate_metrics_text_exposition() {
        let metrics = GateMetrics::new().unwrap();
        metrics.inc_rejected("not_trainable");

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("readiness_gate_delegated_total 0"));
        assert!(text.contains("readiness_gate_rejected_total{reason=\"not_trainable\"} 1"));
        assert!(text.contains("readiness_gate_call_duration_seconds_bucket"));
    }

    #[test]
    fn test_diagnostic_serializes_snake_case_event() {
        let diagnostic = Diagnostic::new(
            DiagnosticEvent::GateUnverified,
            Severity::Debug,
            "Custom",
            "unchecked",
        );
        let json = serde_json::to_value(&diagnostic).unwrap();

        assert_eq!(json["event"], "gate_unverified");
        assert_eq!(json["severity"], "debug");
    }
}
