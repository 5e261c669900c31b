//! Error types for gate setup
//!
//! Rejections of individual calls are not errors; see [`crate::gate::Rejection`].

use crate::models::CapabilityKind;
use thiserror::Error;

/// Registry construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("capability kind '{kind}' is already registered")]
    DuplicateKind { kind: CapabilityKind },
}

/// Errors raised while assembling a gate from configuration
#[derive(Debug, Error)]
pub enum GateError {
    #[error("failed to load gate configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to register gate metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}
