//! Loading of the provision file and `OCR_*` environment overrides.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::config::{EnvOverrides, ProvisionFile};

/// Prefix of every environment override (`OCR_PORT`, `OCR_REPO`, ...).
pub const ENV_PREFIX: &str = "OCR_";

/// Read and parse a YAML provision file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid provision file.
pub fn load_provision_file(path: &Path) -> Result<ProvisionFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
}

/// Collect `OCR_*` overrides from the process environment.
///
/// # Errors
///
/// Returns an error if an override cannot be deserialized.
pub fn load_env() -> Result<EnvOverrides> {
    load_env_from(std::env::vars())
}

/// Collect `OCR_*` overrides from an explicit variable list.
///
/// # Errors
///
/// Returns an error if the variables cannot be deserialized.
pub fn load_env_from(vars: impl IntoIterator<Item = (String, String)>) -> Result<EnvOverrides> {
    envy::prefixed(ENV_PREFIX)
        .from_iter(vars)
        .context("cannot read OCR_* environment overrides")
}
