//! Application service: the provisioning use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::PathBuf;

use provision_common::{InstallSource, ProvisionRequest};

use crate::application::ports::{CommandRunner, HealthProbe, HostFs, ProgressReporter};
use crate::application::services::stages::{
    account::{self, AccountOutcome},
    acquire, activation, ownership, packages, privilege, runtime,
    supervisor::{self, UnitInstall},
};
use crate::domain::config::DEFAULT_UNIT_DIR;
use crate::domain::packages::packages as package_list;
use crate::domain::unit::{UnitSpec, unit_path};
use crate::domain::{ActivationOutcome, ActivationPolicy, CopyReport, ProvisionError, Stage};

/// Knobs that are not part of the request itself.
#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    /// Directory receiving the `.service` file.
    pub unit_dir: PathBuf,
    pub activation: ActivationPolicy,
}

impl Default for ProvisionOptions {
    fn default() -> Self {
        Self {
            unit_dir: PathBuf::from(DEFAULT_UNIT_DIR),
            activation: ActivationPolicy::default(),
        }
    }
}

/// The host-facing ports a run needs.
pub struct Host<'a, R, F, H> {
    pub runner: &'a R,
    pub fs: &'a F,
    pub health: &'a H,
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct ProvisionResult {
    pub account: AccountOutcome,
    /// Present for a local source.
    pub copy_report: Option<CopyReport>,
    pub unit: UnitInstall,
    pub activation: ActivationOutcome,
}

impl ProvisionResult {
    /// All stages applied but the service did not report healthy in time.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.activation.is_ready()
    }
}

/// Bring the host from its current state to a running OCR service.
///
/// Stages run strictly in order and the first fatal error aborts the run;
/// stages already applied are left in place. Activation never fails the
/// run, see [`ProvisionResult::is_degraded`].
///
/// # Errors
///
/// Returns the `ProvisionError` of the first stage that failed.
pub async fn provision<R, F, H>(
    req: &ProvisionRequest,
    host: &Host<'_, R, F, H>,
    reporter: &impl ProgressReporter,
    opts: &ProvisionOptions,
) -> Result<ProvisionResult, ProvisionError>
where
    R: CommandRunner,
    F: HostFs,
    H: HealthProbe,
{
    let Host { runner, fs, health } = *host;

    begin(reporter, Stage::Privilege);
    privilege::require_root(runner).await?;

    begin(reporter, Stage::Packages);
    packages::install_packages(runner, reporter).await?;

    begin(reporter, Stage::Account);
    let account =
        account::ensure_account(runner, reporter, &req.service_user, &req.install_dir).await?;

    begin(reporter, Stage::Acquisition);
    let copy_report = acquire::acquire(runner, fs, reporter, &req.source, &req.install_dir).await?;

    begin(reporter, Stage::Runtime);
    runtime::setup_runtime(runner, fs, reporter, req).await?;

    begin(reporter, Stage::Ownership);
    ownership::fix_ownership(runner, fs, reporter, &req.service_user, &req.install_dir).await?;

    begin(reporter, Stage::Supervisor);
    let unit = supervisor::install_unit(runner, fs, reporter, req, &opts.unit_dir).await?;

    begin(reporter, Stage::Activation);
    let activation =
        activation::activate(runner, fs, health, reporter, req, opts.activation).await;

    Ok(ProvisionResult {
        account,
        copy_report,
        unit,
        activation,
    })
}

fn begin(reporter: &impl ProgressReporter, stage: Stage) {
    tracing::info!(stage = stage.number(), title = stage.title(), "stage started");
    reporter.step(&stage.label());
}

/// Describe what a run would do, one line per stage, without touching the host.
#[must_use]
pub fn plan(req: &ProvisionRequest, opts: &ProvisionOptions) -> Vec<String> {
    Stage::ALL
        .iter()
        .map(|&stage| {
            let action = match stage {
                Stage::Privilege => "require effective uid 0".to_string(),
                Stage::Packages => format!("apt-get install {}", package_list().join(" ")),
                Stage::Account => format!(
                    "ensure system user '{}' (home {}, no login)",
                    req.service_user,
                    req.install_dir.display()
                ),
                Stage::Acquisition => match &req.source {
                    InstallSource::Remote { .. } => format!(
                        "clone {} into {}",
                        req.source,
                        req.install_dir.display()
                    ),
                    InstallSource::Local { path } => format!(
                        "copy {} into {}",
                        path.display(),
                        req.install_dir.display()
                    ),
                },
                Stage::Runtime => format!(
                    "create {} and pip install -r requirements.txt",
                    req.venv_dir().display()
                ),
                Stage::Ownership => format!(
                    "chown -R {user}:{user} {}",
                    req.install_dir.display(),
                    user = req.service_user
                ),
                Stage::Supervisor => format!(
                    "write {} ({})",
                    unit_path(&opts.unit_dir, &req.service_name).display(),
                    UnitSpec::from_request(req).exec_start()
                ),
                Stage::Activation => format!(
                    "enable and restart {}, wait up to {}s for http://127.0.0.1:{}/api/health",
                    req.service_name,
                    opts.activation.timeout.as_secs(),
                    req.service_port
                ),
            };
            format!("{}: {action}", stage.label())
        })
        .collect()
}
