//! Snapshot readiness check

use anyhow::{Context, Result};
use colored::Colorize;
use gate_lib::{
    timing, EstimatorSnapshot, GateConfig, GateOutcome, Readiness, Subject, Trainable,
    TracingSink, UnknownKindPolicy,
};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

use crate::output::{
    color_status, print_error, print_json, print_success, print_warning, OutputFormat,
};

/// Exit status reported when the gate rejects the snapshot
const REJECTED_EXIT_CODE: u8 = 2;

/// Contents of a snapshot file
enum Loaded {
    Snapshot(EstimatorSnapshot),
    /// Valid JSON that does not describe an estimator
    Raw(Value),
}

impl Subject for Loaded {
    fn type_label(&self) -> Cow<'_, str> {
        match self {
            Loaded::Snapshot(snapshot) => snapshot.type_label(),
            Loaded::Raw(value) => value.type_label(),
        }
    }

    fn as_trainable(&self) -> Option<&dyn Trainable> {
        match self {
            Loaded::Snapshot(snapshot) => snapshot.as_trainable(),
            Loaded::Raw(value) => value.as_trainable(),
        }
    }
}

/// What the delegated call found out about a ready snapshot
#[derive(Debug, Serialize)]
struct SnapshotSummary {
    status: &'static str,
    verified_kind: Option<String>,
    evidence: Option<String>,
    capabilities: Vec<String>,
    populated_attributes: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    file: String,
    subject: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<SnapshotSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<String>,
}

impl Loaded {
    fn snapshot(&self) -> Option<&EstimatorSnapshot> {
        match self {
            Loaded::Snapshot(snapshot) => Some(snapshot),
            Loaded::Raw(_) => None,
        }
    }

    fn capabilities(&self) -> Vec<String> {
        self.snapshot()
            .map(|s| s.capabilities.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    fn populated_attributes(&self) -> Vec<String> {
        self.snapshot()
            .map(|s| {
                s.populated_attributes()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn load_subject(path: &Path) -> Result<Loaded> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Snapshot {} is not valid JSON", path.display()))?;

    match serde_json::from_value::<EstimatorSnapshot>(value.clone()) {
        Ok(snapshot) => Ok(Loaded::Snapshot(snapshot)),
        Err(e) => {
            debug!(error = %e, "File does not describe an estimator snapshot");
            Ok(Loaded::Raw(value))
        }
    }
}

fn summarize(subject: &Loaded, readiness: &Readiness) -> SnapshotSummary {
    let (status, verified_kind, evidence) = match readiness {
        Readiness::Verified { kind, evidence } => {
            ("ready", Some(kind.to_string()), Some(evidence.to_string()))
        }
        Readiness::Unverified => ("unverified", None, None),
    };

    SnapshotSummary {
        status,
        verified_kind,
        evidence,
        capabilities: subject.capabilities(),
        populated_attributes: subject.populated_attributes(),
    }
}

/// Check a snapshot file through the gate
pub fn check_snapshot(
    config: &GateConfig,
    path: &Path,
    policy: Option<UnknownKindPolicy>,
    with_metrics: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    let mut config = config.clone();
    if let Some(policy) = policy {
        config.unknown_kind_policy = policy;
    }
    config.metrics_enabled |= with_metrics;

    let sink = Arc::new(TracingSink::new(config.component.clone()));
    let gate = config
        .build_gate(sink.clone())
        .context("Failed to build readiness gate")?;
    let subject = load_subject(path)?;

    let outcome = timing(sink.as_ref(), "check", || {
        gate.call_with_readiness(&subject, summarize)
    });

    let metrics = match gate.metrics() {
        Some(m) if with_metrics => Some(m.encode_text().context("Failed to encode metrics")?),
        _ => None,
    };

    let mut report = CheckReport {
        file: path.display().to_string(),
        subject: subject.type_label().into_owned(),
        status: "rejected",
        reason: None,
        message: None,
        summary: None,
        metrics,
    };
    let exit_code = match outcome {
        GateOutcome::Delegated(summary) => {
            report.status = summary.status;
            report.summary = Some(summary);
            ExitCode::SUCCESS
        }
        GateOutcome::Rejected(rejection) => {
            report.reason = Some(rejection.reason());
            report.message = Some(rejection.to_string());
            ExitCode::from(REJECTED_EXIT_CODE)
        }
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report(&report),
    }
    Ok(exit_code)
}

fn print_report(report: &CheckReport) {
    println!("{}", "Readiness Check".bold());
    println!("{}", "=".repeat(50));
    println!("File:       {}", report.file.cyan());
    println!("Subject:    {}", report.subject.cyan());
    println!("Status:     {}", color_status(report.status));
    println!();

    match (&report.summary, &report.message) {
        (Some(summary), _) => {
            match (&summary.verified_kind, &summary.evidence) {
                (Some(kind), Some(evidence)) => print_success(&format!(
                    "{} is ready ({} verified by '{}')",
                    report.subject, kind, evidence
                )),
                _ => print_warning(&format!(
                    "{} has no registered evidence attribute; readiness not verified",
                    report.subject
                )),
            }
            println!("Capabilities: {}", join_or_none(&summary.capabilities));
            println!("Attributes:   {}", join_or_none(&summary.populated_attributes));
        }
        (None, Some(message)) => {
            print_error(message);
            if let Some(reason) = report.reason {
                println!("Reason:     {}", reason);
            }
        }
        (None, None) => {}
    }

    if let Some(metrics) = &report.metrics {
        println!();
        println!("{}", "Metrics".bold());
        println!("{}", "-".repeat(50));
        print!("{}", metrics);
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_lib::{CapabilityKind, EvidenceAttribute};
    use serde_json::json;

    #[test]
    fn test_raw_json_is_not_trainable() {
        let loaded = Loaded::Raw(json!({ "coef_": [1.0] }));

        assert!(loaded.as_trainable().is_none());
        assert_eq!(loaded.type_label(), "json object");
    }

    #[test]
    fn test_summarize_reports_verified_kind() {
        let snapshot = EstimatorSnapshot::new("SVC")
            .with_capability(CapabilityKind::MARGIN_CLASSIFIER)
            .with_attribute("support_", json!([1, 4]));

        let readiness = Readiness::Verified {
            kind: CapabilityKind::MARGIN_CLASSIFIER,
            evidence: EvidenceAttribute::new("support_"),
        };

        let summary = summarize(&Loaded::Snapshot(snapshot), &readiness);

        assert_eq!(summary.status, "ready");
        assert_eq!(summary.verified_kind.as_deref(), Some("margin_classifier"));
        assert_eq!(summary.evidence.as_deref(), Some("support_"));
        assert_eq!(summary.populated_attributes, vec!["support_".to_string()]);
    }

    #[test]
    fn test_summarize_unknown_kind_is_unverified() {
        let snapshot = EstimatorSnapshot::new("GaussianNB")
            .with_capability(CapabilityKind::new("naive_bayes"));

        let summary = summarize(&Loaded::Snapshot(snapshot), &Readiness::Unverified);

        assert_eq!(summary.status, "unverified");
        assert!(summary.verified_kind.is_none());
        assert_eq!(summary.capabilities, vec!["naive_bayes".to_string()]);
    }

    #[test]
    fn test_raw_json_has_no_capabilities() {
        let loaded = Loaded::Raw(json!({ "capabilities": ["linear_coefficient"] }));

        assert!(loaded.capabilities().is_empty());
        assert!(loaded.populated_attributes().is_empty());
    }

    #[test]
    fn test_join_or_none() {
        assert_eq!(join_or_none(&[]), "(none)");
        assert_eq!(join_or_none(&["a".to_string(), "b".to_string()]), "a, b");
    }
}
