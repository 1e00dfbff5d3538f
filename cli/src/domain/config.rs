//! Provisioning configuration: defaults, provision file schema, and layering.
//!
//! Pure functions only: no I/O, no async, no filesystem access. The
//! environment and the provision file are read by `crate::infra::config` and
//! handed in as plain values.

use std::path::{Path, PathBuf};

use provision_common::{InstallSource, ProvisionRequest, RequestError, ServicePort};
use serde::{Deserialize, Serialize};

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REPO: &str = "paddleocr-web/ocr-service";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_INSTALL_DIR: &str = "/opt/paddleocr";
pub const DEFAULT_SERVICE_USER: &str = "paddleocr";
pub const DEFAULT_SERVICE_NAME: &str = "paddleocr";
pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";

// ── Inputs ───────────────────────────────────────────────────────────────────

/// Declarative provision file (`--config` / `OCR_CONFIG`), YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionFile {
    pub install_dir: Option<PathBuf>,
    pub service_user: Option<String>,
    pub service_name: Option<String>,
    pub port: Option<u16>,
    /// Written as `remote: {..}` or `local: {..}` rather than a YAML tag.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub source: Option<InstallSource>,
}

/// `OCR_*` environment overrides. Values stay textual so validation
/// produces the same errors as the equivalent flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnvOverrides {
    pub port: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub install_dir: Option<PathBuf>,
    pub service_user: Option<String>,
    pub source_dir: Option<PathBuf>,
    /// Path to a provision file.
    pub config: Option<PathBuf>,
}

/// Values taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub github: bool,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub port: Option<String>,
    pub source_dir: Option<PathBuf>,
    pub install_dir: Option<PathBuf>,
    pub service_user: Option<String>,
    pub service_name: Option<String>,
}

// ── Layering ─────────────────────────────────────────────────────────────────

/// Merge defaults, provision file, environment and flags (highest wins) into
/// a validated request.
///
/// The source is remote when `--github` is given or the provision file
/// declares a remote source; otherwise the first local directory found among
/// flag, environment, file and `cwd` is used.
pub fn resolve(
    file: &ProvisionFile,
    env: &EnvOverrides,
    flags: &FlagOverrides,
    cwd: &Path,
) -> Result<ProvisionRequest, RequestError> {
    let service_port = match flags.port.as_deref().or(env.port.as_deref()) {
        Some(text) => ServicePort::parse(text)?,
        None => ServicePort::try_from(file.port.unwrap_or(DEFAULT_PORT))?,
    };

    let request = ProvisionRequest {
        source: resolve_source(file, env, flags, cwd),
        install_dir: first_of([
            flags.install_dir.clone(),
            env.install_dir.clone(),
            file.install_dir.clone(),
        ])
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INSTALL_DIR)),
        service_port,
        service_user: first_of([
            flags.service_user.clone(),
            env.service_user.clone(),
            file.service_user.clone(),
        ])
        .unwrap_or_else(|| DEFAULT_SERVICE_USER.to_string()),
        service_name: first_of([flags.service_name.clone(), file.service_name.clone()])
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
    };
    request.validate()?;
    Ok(request)
}

fn resolve_source(
    file: &ProvisionFile,
    env: &EnvOverrides,
    flags: &FlagOverrides,
    cwd: &Path,
) -> InstallSource {
    let (file_repo, file_branch, file_local) = match &file.source {
        Some(InstallSource::Remote { repo, branch }) => (Some(repo.clone()), Some(branch.clone()), None),
        Some(InstallSource::Local { path }) => (None, None, Some(path.clone())),
        None => (None, None, None),
    };

    if flags.github || file_repo.is_some() {
        return InstallSource::Remote {
            repo: first_of([flags.repo.clone(), env.repo.clone(), file_repo])
                .unwrap_or_else(|| DEFAULT_REPO.to_string()),
            branch: first_of([flags.branch.clone(), env.branch.clone(), file_branch])
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        };
    }

    InstallSource::Local {
        path: first_of([flags.source_dir.clone(), env.source_dir.clone(), file_local])
            .unwrap_or_else(|| cwd.to_path_buf()),
    }
}

fn first_of<T, const N: usize>(candidates: [Option<T>; N]) -> Option<T> {
    candidates.into_iter().flatten().next()
}

// ── Unit tests ───────────────────────────────────────────────────────────────
