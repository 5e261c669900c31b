//! Nested JSON flattening

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tabled::Tabled;

use crate::output::{format_leaf, print_json, print_table, OutputFormat};

/// Row for flattened key table
#[derive(Tabled, Serialize)]
struct LeafRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Flatten a JSON object file and print its leaves
pub fn flatten_file(path: &Path, separator: &str, format: OutputFormat) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let Value::Object(map) = value else {
        bail!("{} must contain a JSON object at the top level", path.display());
    };

    match format {
        OutputFormat::Json => print_json(&gate_lib::flatten_owned(&map, separator)),
        OutputFormat::Table => {
            let rows: Vec<LeafRow> = gate_lib::flatten_with(&map, separator)
                .into_iter()
                .map(|(key, leaf)| LeafRow {
                    key,
                    value: format_leaf(leaf),
                })
                .collect();
            print_table(&rows, format)
        }
    }
}
