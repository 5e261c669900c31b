//! Readiness gate library for trained estimators
//!
//! This crate provides the core functionality for:
//! - Describing trainable objects and their capability families
//! - A registry of evidence attributes that prove training completed
//! - A gate that only delegates calls for ready objects
//! - Timing, failure-catching and argument-logging wrappers
//! - Flattening of nested JSON mappings
//! - Diagnostics, metrics and layered configuration

pub mod config;
pub mod error;
pub mod flatten;
pub mod gate;
pub mod models;
pub mod observability;
pub mod registry;
pub mod wrappers;

pub use config::GateConfig;
pub use error::{GateError, RegistryError};
pub use flatten::{flatten, flatten_owned, flatten_with, DEFAULT_SEPARATOR};
pub use gate::{Gate, GateBuilder, GateOutcome, Guarded, Readiness, Rejection, UnknownKindPolicy};
pub use models::*;
pub use observability::{
    Diagnostic, DiagnosticEvent, DiagnosticSink, GateMetrics, MemorySink, Severity, TracingSink,
};
pub use registry::{ReadinessRegistry, RegistryEntry};
pub use wrappers::{catching, log_args, timing};
