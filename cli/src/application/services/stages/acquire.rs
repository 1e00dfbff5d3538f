//! Stage 4: place the application files into the install directory.
//!
//! A remote source is cloned into a hidden sibling first and swapped in
//! with a rename, so a failed fetch never destroys a working install. A
//! local source is copied best-effort.
//!
//! Both paths refuse a source without the application files, and refuse
//! to write over a non-empty install directory that holds no application.

use std::path::Path;
use std::time::Duration;

use provision_common::{InstallSource, REQUIRED_SUBDIRS};

use crate::application::ports::{CommandRunner, HostFs, ProgressReporter};
use crate::domain::ProvisionError;
use crate::domain::artifact::{SKIPPED_ENTRIES, missing_app_files, missing_subdirs, staging_dir};
use crate::domain::CopyReport;

use super::run_checked;

/// Upper bound for a shallow clone.
pub const CLONE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Acquire `source` into `install_dir` and verify the directory layout.
///
/// Returns the copy report for a local source, `None` for a remote one.
///
/// # Errors
///
/// Returns `ProvisionError::Acquisition` if the source cannot be fetched or
/// read, is not an application tree, or `install_dir` holds something
/// else; `ProvisionError::MissingDirectories` if a required subdirectory
/// is still absent afterwards.
pub async fn acquire(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    reporter: &impl ProgressReporter,
    source: &InstallSource,
    install_dir: &Path,
) -> Result<Option<CopyReport>, ProvisionError> {
    ensure_replaceable(fs, install_dir)?;
    let report = match source {
        InstallSource::Remote { repo, branch } => {
            let url = source.clone_url().unwrap_or_default();
            fetch_remote(runner, fs, reporter, repo, &url, branch, install_dir).await?;
            None
        }
        InstallSource::Local { path } => Some(copy_local(fs, reporter, path, install_dir)?),
    };
    ensure_layout(fs, reporter, install_dir)?;
    Ok(report)
}

/// Shallow-clone `branch` and swap it in for the current install.
///
/// # Errors
///
/// Returns `ProvisionError::Acquisition` on clone or swap failure. On clone
/// failure the previous install is untouched.
pub async fn fetch_remote(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    reporter: &impl ProgressReporter,
    repo: &str,
    url: &str,
    branch: &str,
    install_dir: &Path,
) -> Result<(), ProvisionError> {
    let staging = staging_dir(install_dir);
    if fs.exists(&staging) {
        tracing::debug!(path = %staging.display(), "removing stale staging directory");
        fs.remove_dir_all(&staging).map_err(acquisition)?;
    }
    if let Some(parent) = install_dir.parent() {
        fs.create_dir_all(parent).map_err(acquisition)?;
    }

    reporter.step(&format!("cloning {repo} ({branch})..."));
    let target = staging.to_string_lossy();
    let cloned = run_checked(
        runner,
        "git",
        &["clone", "--depth", "1", "--single-branch", "--branch", branch, url, &target],
        Some(CLONE_TIMEOUT),
    )
    .await;
    if let Err(detail) = cloned {
        if fs.exists(&staging) {
            if let Err(e) = fs.remove_dir_all(&staging) {
                tracing::warn!(path = %staging.display(), error = %e, "could not clean up staging directory");
            }
        }
        return Err(ProvisionError::Acquisition { detail });
    }
    if let Err(e) = ensure_app_tree(fs, &staging, &format!("{repo}@{branch}")) {
        if let Err(cleanup) = fs.remove_dir_all(&staging) {
            tracing::warn!(path = %staging.display(), error = %cleanup, "could not clean up staging directory");
        }
        return Err(e);
    }

    if fs.exists(install_dir) {
        fs.remove_dir_all(install_dir).map_err(acquisition)?;
    }
    fs.rename(&staging, install_dir).map_err(acquisition)?;
    reporter.success(&format!("cloned {repo}@{branch} into {}", install_dir.display()));
    Ok(())
}

/// Copy a local source tree into `install_dir`, skipping VCS metadata,
/// virtualenvs and bytecode caches.
///
/// Per-file failures are warned about and returned, never fatal.
///
/// # Errors
///
/// Returns `ProvisionError::Acquisition` if `source` is not a directory,
/// lacks the application files, or `install_dir` cannot be created.
pub fn copy_local(
    fs: &impl HostFs,
    reporter: &impl ProgressReporter,
    source: &Path,
    install_dir: &Path,
) -> Result<CopyReport, ProvisionError> {
    if !fs.is_dir(source) {
        return Err(ProvisionError::Acquisition {
            detail: format!("source directory {} does not exist", source.display()),
        });
    }
    ensure_app_tree(fs, source, &source.display().to_string())?;
    fs.create_dir_all(install_dir).map_err(acquisition)?;

    reporter.step(&format!("copying {} ...", source.display()));
    let report = fs.copy_tree(source, install_dir, SKIPPED_ENTRIES);
    for failure in &report.failures {
        tracing::warn!(path = %failure.path.display(), reason = %failure.reason, "file not copied");
        reporter.warn(&format!("could not copy {}: {}", failure.path.display(), failure.reason));
    }
    reporter.success(&format!(
        "copied {} files into {}",
        report.copied,
        install_dir.display()
    ));
    Ok(report)
}

/// Refuse an existing install directory that is neither empty nor a
/// previous install (no `app.py`); it is about to be replaced.
///
/// # Errors
///
/// Returns `ProvisionError::Acquisition` naming the directory.
pub fn ensure_replaceable(fs: &impl HostFs, install_dir: &Path) -> Result<(), ProvisionError> {
    if !fs.exists(install_dir) || fs.is_empty_dir(install_dir) {
        return Ok(());
    }
    let marker = install_dir.join(APP_MARKER);
    if fs.exists(&marker) && !fs.is_dir(&marker) {
        return Ok(());
    }
    Err(ProvisionError::Acquisition {
        detail: format!(
            "{} is not empty and holds no {APP_MARKER}; refusing to replace it",
            install_dir.display()
        ),
    })
}

/// The file that identifies a previous install.
const APP_MARKER: &str = "app.py";

fn ensure_app_tree(fs: &impl HostFs, dir: &Path, label: &str) -> Result<(), ProvisionError> {
    let missing = missing_app_files(dir, |p| fs.exists(p) && !fs.is_dir(p));
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProvisionError::Acquisition {
            detail: format!("{label} is not an OCR service tree: missing {}", missing.join(", ")),
        })
    }
}

/// Create the required subdirectories and verify they are all present.
///
/// # Errors
///
/// Returns `ProvisionError::MissingDirectories` naming every absent one.
pub fn ensure_layout(
    fs: &impl HostFs,
    reporter: &impl ProgressReporter,
    install_dir: &Path,
) -> Result<(), ProvisionError> {
    for name in REQUIRED_SUBDIRS {
        let dir = install_dir.join(name);
        if let Err(e) = fs.create_dir_all(&dir) {
            reporter.warn(&format!("{e:#}"));
        }
    }
    let missing = missing_subdirs(install_dir, |p| fs.is_dir(p));
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProvisionError::MissingDirectories { missing })
    }
}

fn acquisition(e: anyhow::Error) -> ProvisionError {
    ProvisionError::Acquisition { detail: format!("{e:#}") }
}
