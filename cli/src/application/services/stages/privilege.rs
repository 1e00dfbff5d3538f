//! Stage 1: refuse to run without root.

use crate::application::ports::CommandRunner;
use crate::domain::ProvisionError;

/// Require an effective uid of 0.
///
/// This is the first thing a run does; nothing on the host has been
/// touched when it fails.
///
/// # Errors
///
/// Returns `ProvisionError::Permission` when `id -u` does not report `0`
/// or cannot be run at all.
pub async fn require_root(runner: &impl CommandRunner) -> Result<(), ProvisionError> {
    let output = runner
        .run("id", &["-u"])
        .await
        .map_err(|e| ProvisionError::Permission {
            uid: format!("unknown ({e:#})"),
        })?;
    let uid = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if output.status.success() && uid == "0" {
        return Ok(());
    }
    Err(ProvisionError::Permission {
        uid: if uid.is_empty() { "unknown".to_string() } else { uid },
    })
}
