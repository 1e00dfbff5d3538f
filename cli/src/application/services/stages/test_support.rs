//! Shared test helpers for the stage tests.
//!
//! Provides cross-platform `exit_status()`, a scripted `CommandRunner`, an
//! in-memory `HostFs`, and a silent `ProgressReporter`.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use anyhow::Result;
use provision_common::ServicePort;

use crate::application::ports::{CommandRunner, HealthProbe, HostFs, ProgressReporter};
use crate::domain::{CopyReport, HealthStatus};

/// Build an `ExitStatus` from a logical exit code (cross-platform).
#[cfg(unix)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    std::process::ExitStatus::from_raw(code as u32)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn fail_output(stderr: &[u8]) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── ScriptedRunner ────────────────────────────────────────────────────────────

type Script = Box<dyn Fn(&[String]) -> Result<Output>>;

/// `CommandRunner` that records every command line and answers from a
/// closure receiving `[program, args...]`.
pub struct ScriptedRunner {
    script: Script,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(script: impl Fn(&[String]) -> Result<Output> + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Recorded command lines, space-joined, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("mutex poisoned").clone()
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let argv: Vec<String> = std::iter::once(program)
            .chain(args.iter().copied())
            .map(str::to_owned)
            .collect();
        self.calls.lock().expect("mutex poisoned").push(argv.join(" "));
        (self.script)(&argv)
    }

    async fn run_with_timeout(&self, program: &str, args: &[&str], _: Duration) -> Result<Output> {
        self.run(program, args).await
    }
}

// ── MemFs ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemState {
    pub dirs: BTreeSet<PathBuf>,
    pub files: BTreeMap<PathBuf, String>,
    pub modes: BTreeMap<PathBuf, u32>,
    /// `create_dir_all` fails for these paths.
    pub deny_create: BTreeSet<PathBuf>,
    /// Returned by every `copy_tree` call.
    pub copy_report: CopyReport,
    pub copies: Vec<(PathBuf, PathBuf)>,
}

/// In-memory `HostFs`.
#[derive(Default)]
pub struct MemFs {
    state: Mutex<MemState>,
}

impl MemFs {
    pub fn state(&self) -> MutexGuard<'_, MemState> {
        self.state.lock().expect("mutex poisoned")
    }

    pub fn add_dir(&self, path: &str) {
        let mut state = self.state();
        for ancestor in Path::new(path).ancestors() {
            state.dirs.insert(ancestor.to_path_buf());
        }
    }

    pub fn add_file(&self, path: &str, content: &str) {
        if let Some(parent) = Path::new(path).parent() {
            self.add_dir(&parent.to_string_lossy());
        }
        self.state().files.insert(PathBuf::from(path), content.to_string());
    }
}

impl HostFs for MemFs {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state();
        state.dirs.contains(path) || state.files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.state().dirs.contains(path)
    }

    fn is_empty_dir(&self, path: &Path) -> bool {
        let state = self.state();
        state.dirs.contains(path)
            && !state.dirs.iter().any(|d| d.parent() == Some(path))
            && !state.files.keys().any(|f| f.parent() == Some(path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.state();
        if state.deny_create.contains(path) {
            anyhow::bail!("creating directory {}: permission denied", path.display());
        }
        for ancestor in path.ancestors() {
            state.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.state();
        anyhow::ensure!(state.dirs.contains(path), "removing directory {}: not found", path.display());
        state.dirs.retain(|d| !d.starts_with(path));
        state.files.retain(|f, _| !f.starts_with(path));
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut state = self.state();
        anyhow::ensure!(state.dirs.contains(from), "renaming {}: not found", from.display());
        let moved = |p: &Path| p.strip_prefix(from).map(|rest| to.join(rest)).ok();
        let dirs: BTreeSet<PathBuf> = state
            .dirs
            .iter()
            .map(|d| moved(d).unwrap_or_else(|| d.clone()))
            .collect();
        let files: BTreeMap<PathBuf, String> = state
            .files
            .iter()
            .map(|(f, c)| (moved(f).unwrap_or_else(|| f.clone()), c.clone()))
            .collect();
        state.dirs = dirs;
        state.files = files;
        Ok(())
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.state().files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.state()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("reading file {}: not found", path.display()))
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()> {
        self.state().modes.insert(path.to_path_buf(), mode);
        Ok(())
    }

    fn copy_tree(&self, from: &Path, to: &Path, _skip: &[&str]) -> CopyReport {
        let mut state = self.state();
        state.dirs.insert(to.to_path_buf());
        state.copies.push((from.to_path_buf(), to.to_path_buf()));
        state.copy_report.clone()
    }
}

// ── Health and reporting ──────────────────────────────────────────────────────

/// Health probe that always answers with the same status.
pub struct FixedHealth(pub HealthStatus);

impl HealthProbe for FixedHealth {
    async fn probe(&self, _: ServicePort) -> HealthStatus {
        self.0.clone()
    }
}

/// Reporter that collects messages as `"<kind>: <message>"`.
#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("mutex poisoned").clone()
    }

    fn push(&self, kind: &str, message: &str) {
        self.messages
            .lock()
            .expect("mutex poisoned")
            .push(format!("{kind}: {message}"));
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.push("step", message);
    }
    fn success(&self, message: &str) {
        self.push("success", message);
    }
    fn warn(&self, message: &str) {
        self.push("warn", message);
    }
    fn info(&self, message: &str) {
        self.push("info", message);
    }
}
