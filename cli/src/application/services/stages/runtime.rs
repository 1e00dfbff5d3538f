//! Stage 5: isolated Python environment with the service's requirements.

use std::time::Duration;

use provision_common::ProvisionRequest;

use crate::application::ports::{CommandRunner, HostFs, ProgressReporter};
use crate::domain::ProvisionError;

use super::run_checked;

pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Paddle wheels are large; allow for slow mirrors.
pub const PIP_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const VENV_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Create (or refresh) `<install_dir>/venv` and install the requirements.
///
/// # Errors
///
/// Returns `ProvisionError::DependencyInstall` if the requirements file is
/// missing or any of the venv/pip commands fails.
pub async fn setup_runtime(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    reporter: &impl ProgressReporter,
    req: &ProvisionRequest,
) -> Result<(), ProvisionError> {
    let requirements = req.install_dir.join(REQUIREMENTS_FILE);
    if !fs.exists(&requirements) {
        return Err(ProvisionError::DependencyInstall {
            step: "requirements",
            detail: format!("{} not found", requirements.display()),
        });
    }

    let venv = req.venv_dir();
    let venv_arg = venv.to_string_lossy();
    reporter.step(&format!("creating virtualenv {venv_arg}..."));
    run_checked(runner, "python3", &["-m", "venv", &venv_arg], Some(VENV_TIMEOUT))
        .await
        .map_err(|detail| ProvisionError::DependencyInstall { step: "venv", detail })?;

    let pip = venv.join("bin").join("pip");
    let pip = pip.to_string_lossy();
    reporter.step("upgrading pip...");
    run_checked(runner, &pip, &["install", "--upgrade", "pip"], Some(PIP_TIMEOUT))
        .await
        .map_err(|detail| ProvisionError::DependencyInstall {
            step: "pip upgrade",
            detail,
        })?;

    reporter.step("installing python requirements...");
    let requirements = requirements.to_string_lossy();
    run_checked(runner, &pip, &["install", "-r", &requirements], Some(PIP_TIMEOUT))
        .await
        .map_err(|detail| ProvisionError::DependencyInstall {
            step: "pip install",
            detail,
        })?;
    reporter.success("python environment ready");
    Ok(())
}
