//! Stage 6: hand the install tree to the service account.

use std::path::Path;

use crate::application::ports::{CommandRunner, HostFs, ProgressReporter};
use crate::domain::ProvisionError;

use super::run_checked;

/// Mode of the install directory itself: owner rwx, world r-x.
pub const INSTALL_DIR_MODE: u32 = 0o755;

/// `chown -R user:user` the install tree and set its mode.
///
/// # Errors
///
/// Returns `ProvisionError::Ownership` if either step fails.
pub async fn fix_ownership(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    reporter: &impl ProgressReporter,
    user: &str,
    install_dir: &Path,
) -> Result<(), ProvisionError> {
    let path = install_dir.to_string_lossy();
    let owner = format!("{user}:{user}");
    run_checked(runner, "chown", &["-R", &owner, &path], None)
        .await
        .map_err(|detail| ProvisionError::Ownership {
            path: path.to_string(),
            detail,
        })?;
    fs.set_permissions(install_dir, INSTALL_DIR_MODE)
        .map_err(|e| ProvisionError::Ownership {
            path: path.to_string(),
            detail: format!("{e:#}"),
        })?;
    reporter.success(&format!("{path} owned by {owner}"));
    Ok(())
}
