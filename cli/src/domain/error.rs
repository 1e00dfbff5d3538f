//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::stage::Stage;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// `DependencyInstall` steps that belong to the python environment stage.
pub const RUNTIME_STEPS: &[&str] = &["requirements", "venv", "pip upgrade", "pip install"];

/// Fatal failures of the provisioning pipeline.
///
/// Any of these aborts the run; stages already applied are left in place.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Root privileges are required (running as uid {uid}). Re-run with: sudo ocr-provision")]
    Permission { uid: String },

    #[error("Dependency installation failed ({step}).\n{detail}")]
    DependencyInstall { step: &'static str, detail: String },

    #[error("Cannot create service account '{user}'.\n{detail}")]
    Account { user: String, detail: String },

    #[error("Cannot acquire application source.\n{detail}")]
    Acquisition { detail: String },

    #[error("Install directory is missing required subdirectories: {}", missing.join(", "))]
    MissingDirectories { missing: Vec<String> },

    #[error("Cannot set ownership of {path}.\n{detail}")]
    Ownership { path: String, detail: String },

    #[error("Cannot install systemd unit {path}.\n{detail}")]
    Supervisor { path: String, detail: String },
}

impl ProvisionError {
    /// Stage at which the run aborted.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Permission { .. } => Stage::Privilege,
            Self::DependencyInstall { step, .. } if RUNTIME_STEPS.contains(step) => Stage::Runtime,
            Self::DependencyInstall { .. } => Stage::Packages,
            Self::Account { .. } => Stage::Account,
            Self::Acquisition { .. } | Self::MissingDirectories { .. } => Stage::Acquisition,
            Self::Ownership { .. } => Stage::Ownership,
            Self::Supervisor { .. } => Stage::Supervisor,
        }
    }
}
