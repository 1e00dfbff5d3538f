use std::path::PathBuf;

use thiserror::Error;

/// Validation failures for a provisioning request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Invalid port '{0}': must be a number between 1 and 65535")]
    InvalidPort(String),

    #[error("Invalid install directory '{}': {reason}", path.display())]
    InvalidInstallDir { path: PathBuf, reason: &'static str },

    #[error("Invalid repository '{0}': expected owner/name")]
    InvalidRepo(String),

    #[error("Invalid branch name '{0}'")]
    InvalidBranch(String),

    #[error("Invalid {kind} '{value}': must match ^[a-z_][a-z0-9_-]{{0,31}}$")]
    InvalidAccountName { kind: &'static str, value: String },
}
