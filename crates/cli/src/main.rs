//! Readiness gate CLI
//!
//! Checks exported estimator snapshots against the readiness registry,
//! lists the registered capability kinds, and flattens nested JSON files.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use commands::{check, flatten, kinds};
use gate_lib::UnknownKindPolicy;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Readiness gate CLI
#[derive(Parser)]
#[command(name = "gatectl")]
#[command(author, version, about = "CLI for the estimator readiness gate", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML or JSON); defaults to ~/.config/gatectl/config.toml if present
    #[arg(long, env = "GATECTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose diagnostics
    #[arg(long, short)]
    pub verbose: bool,

    /// Emit diagnostics as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered capability kinds in precedence order
    Kinds,

    /// Check whether an estimator snapshot is ready for use
    Check {
        /// Path to the snapshot JSON file
        snapshot: PathBuf,

        /// Override the unknown-kind policy from configuration
        #[arg(long)]
        policy: Option<PolicyArg>,

        /// Print gate metrics after the check
        #[arg(long)]
        metrics: bool,
    },

    /// Flatten a nested JSON object into single-level keys
    Flatten {
        /// Path to the JSON file
        file: PathBuf,

        /// Separator between path segments (defaults to configuration)
        #[arg(long, short)]
        separator: Option<String>,
    },
}

/// Unknown-kind policy as accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    AssumeReady,
    Reject,
}

impl From<PolicyArg> for UnknownKindPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::AssumeReady => UnknownKindPolicy::AssumeReady,
            PolicyArg::Reject => UnknownKindPolicy::Reject,
        }
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let gate_config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Kinds => {
            kinds::list_kinds(&gate_config, cli.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            snapshot,
            policy,
            metrics,
        } => check::check_snapshot(
            &gate_config,
            &snapshot,
            policy.map(Into::into),
            metrics,
            cli.format,
        ),
        Commands::Flatten { file, separator } => {
            let separator = separator.unwrap_or_else(|| gate_config.flatten_separator.clone());
            flatten::flatten_file(&file, &separator, cli.format)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
