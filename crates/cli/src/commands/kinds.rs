//! Registry listing

use anyhow::{Context, Result};
use gate_lib::GateConfig;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_table, OutputFormat};

/// Row for the capability kinds table
#[derive(Tabled, Serialize)]
struct KindRow {
    #[tabled(rename = "Precedence")]
    precedence: usize,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Evidence Attribute")]
    evidence: String,
}

/// List registered kinds, built-in ones first
pub fn list_kinds(config: &GateConfig, format: OutputFormat) -> Result<()> {
    let registry = config
        .build_registry()
        .context("Invalid extra_kinds in configuration")?;

    let rows: Vec<KindRow> = registry
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| KindRow {
            precedence: i + 1,
            kind: entry.kind.to_string(),
            evidence: entry.evidence.to_string(),
        })
        .collect();

    print_table(&rows, format)
}
