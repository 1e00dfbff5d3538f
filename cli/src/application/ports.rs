//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use provision_common::ServicePort;

use crate::domain::{CopyReport, HealthStatus};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Host filesystem operations used by the provisioning stages.
pub trait HostFs {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    /// A directory with no entries. False for files and missing paths.
    fn is_empty_dir(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()>;
    /// Recursively copy `from` into `to`, best-effort.
    ///
    /// Directories named in `skip` and the destination itself (when nested
    /// inside the source) are not descended into. Only regular files are
    /// copied; pipes, sockets, devices and symlinks to directories land in
    /// `skipped`. Never fails as a whole:
    /// every per-entry error is recorded in the returned report.
    fn copy_tree(&self, from: &Path, to: &Path, skip: &[&str]) -> CopyReport;
}

// ── Health Port ───────────────────────────────────────────────────────────────

/// Probes the service's `/api/health` endpoint.
#[allow(async_fn_in_trait)]
pub trait HealthProbe {
    async fn probe(&self, port: ServicePort) -> HealthStatus;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit an informational notice.
    fn info(&self, message: &str);
}
