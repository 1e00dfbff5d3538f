//! Stage 7: register the service with systemd.

use std::path::{Path, PathBuf};

use provision_common::ProvisionRequest;

use crate::application::ports::{CommandRunner, HostFs, ProgressReporter};
use crate::domain::ProvisionError;
use crate::domain::unit::{UnitSpec, render, unit_path};

use super::run_checked;

/// Where the unit went and whether its content changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitInstall {
    pub path: PathBuf,
    pub changed: bool,
}

/// Write `<unit_dir>/<service_name>.service` and reload systemd.
///
/// The file is only rewritten when its content differs; the daemon is
/// reloaded either way.
///
/// # Errors
///
/// Returns `ProvisionError::Supervisor` if the unit cannot be written or
/// `systemctl daemon-reload` fails.
pub async fn install_unit(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    reporter: &impl ProgressReporter,
    req: &ProvisionRequest,
    unit_dir: &Path,
) -> Result<UnitInstall, ProvisionError> {
    let path = unit_path(unit_dir, &req.service_name);
    let content = render(&UnitSpec::from_request(req));
    let supervisor_err = |detail: String| ProvisionError::Supervisor {
        path: path.display().to_string(),
        detail,
    };

    let current = fs.read_to_string(&path).ok();
    let changed = current.as_deref() != Some(content.as_str());
    if changed {
        fs.create_dir_all(unit_dir)
            .and_then(|()| fs.write(&path, &content))
            .map_err(|e| supervisor_err(format!("{e:#}")))?;
        tracing::info!(path = %path.display(), "unit file written");
    } else {
        tracing::debug!(path = %path.display(), "unit file unchanged");
    }

    run_checked(runner, "systemctl", &["daemon-reload"], None)
        .await
        .map_err(supervisor_err)?;

    reporter.success(&format!(
        "{} {}",
        path.display(),
        if changed { "installed" } else { "unchanged" }
    ));
    Ok(UnitInstall { path, changed })
}
