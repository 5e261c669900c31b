//! Configuration discovery for the CLI

use anyhow::{Context, Result};
use gate_lib::GateConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load gate configuration from an explicit path, the user config file, or the environment only
pub fn load(override_path: Option<&Path>) -> Result<GateConfig> {
    let path = match override_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|path| path.exists()),
    };

    debug!(config_path = ?path, "Loading gate configuration");
    GateConfig::load(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Failed to load config from environment".to_string(),
    })
}

/// Get the user-level configuration file path
fn default_config_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".config").join("gatectl").join("config.toml"))
}
