//! Stage 2: OS package installation.

use std::time::Duration;

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::domain::ProvisionError;
use crate::domain::packages::{apt_install_args, packages};

use super::run_checked;

/// apt on a fresh host can easily take several minutes.
pub const APT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Refresh the package index and install the fixed package list.
///
/// Re-running is safe: apt treats already-installed packages as a no-op.
///
/// # Errors
///
/// Returns `ProvisionError::DependencyInstall` if either apt invocation fails.
pub async fn install_packages(
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
) -> Result<(), ProvisionError> {
    reporter.step("refreshing package index...");
    run_checked(runner, "apt-get", &["update"], Some(APT_TIMEOUT))
        .await
        .map_err(|detail| ProvisionError::DependencyInstall {
            step: "apt-get update",
            detail,
        })?;

    let pkgs = packages();
    reporter.step(&format!("installing {} packages...", pkgs.len()));
    run_checked(runner, "env", &apt_install_args(), Some(APT_TIMEOUT))
        .await
        .map_err(|detail| ProvisionError::DependencyInstall {
            step: "apt-get install",
            detail,
        })?;
    reporter.success(&format!("system packages installed ({})", pkgs.join(" ")));
    Ok(())
}
