//! Outcome of placing application files into the install directory.

use std::path::{Path, PathBuf};

use provision_common::REQUIRED_SUBDIRS;

/// Directory names never copied from a local source tree.
pub const SKIPPED_ENTRIES: &[&str] = &[".git", "venv", "__pycache__"];

/// Files whose presence marks a directory as an OCR service tree.
pub const APP_FILES: &[&str] = &["app.py", "requirements.txt"];

/// Entries of [`APP_FILES`] absent from `dir`, according to `is_file`.
pub fn missing_app_files(dir: &Path, is_file: impl Fn(&Path) -> bool) -> Vec<&'static str> {
    APP_FILES
        .iter()
        .copied()
        .filter(|name| !is_file(&dir.join(name)))
        .collect()
}

/// A single file that could not be copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Per-file results of a best-effort local copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: usize,
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<CopyFailure>,
}

impl CopyReport {
    pub fn record_failure(&mut self, path: &Path, reason: impl ToString) {
        self.failures.push(CopyFailure {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        });
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Required subdirectories of `install_dir` for which `is_dir` is false.
pub fn missing_subdirs(install_dir: &Path, is_dir: impl Fn(&Path) -> bool) -> Vec<String> {
    REQUIRED_SUBDIRS
        .iter()
        .filter(|name| !is_dir(&install_dir.join(name)))
        .map(|name| (*name).to_string())
        .collect()
}

/// Sibling of `install_dir` that receives a fresh clone before it replaces
/// the live install, e.g. `/opt/.paddleocr.incoming`.
#[must_use]
pub fn staging_dir(install_dir: &Path) -> PathBuf {
    let name = install_dir
        .file_name()
        .map_or_else(|| "install".into(), |n| n.to_string_lossy());
    let staged = format!(".{name}.incoming");
    install_dir
        .parent()
        .map_or_else(|| PathBuf::from(&staged), |p| p.join(&staged))
}
