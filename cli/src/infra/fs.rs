//! Filesystem infrastructure: implements the `HostFs` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::HostFs;
use crate::domain::CopyReport;

/// Production filesystem implementation of `HostFs`.
pub struct LocalFs;

impl HostFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_empty_dir(&self, path: &Path) -> bool {
        std::fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_none())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("creating directory {}", path.display()))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("removing directory {}", path.display()))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::rename(from, to)
            .with_context(|| format!("renaming {} to {}", from.display(), to.display()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content).with_context(|| format!("writing file {}", path.display()))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading file {}", path.display()))
    }

    #[cfg(unix)]
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .with_context(|| format!("setting permissions on {}", path.display()))
    }

    #[cfg(not(unix))]
    fn set_permissions(&self, _path: &Path, _mode: u32) -> Result<()> {
        Ok(())
    }

    fn copy_tree(&self, from: &Path, to: &Path, skip: &[&str]) -> CopyReport {
        let mut report = CopyReport::default();
        let (Ok(src), Ok(dst)) = (from.canonicalize(), to.canonicalize()) else {
            report.record_failure(from, "cannot resolve source or destination");
            return report;
        };
        if src == dst {
            tracing::debug!(path = %src.display(), "source is the install directory; nothing to copy");
            return report;
        }
        copy_dir(&src, &dst, &dst, skip, &mut report);
        report
    }
}

fn copy_dir(src: &Path, dst: &Path, install_root: &Path, skip: &[&str], report: &mut CopyReport) {
    let entries = match std::fs::read_dir(src) {
        Ok(entries) => entries,
        Err(e) => {
            report.record_failure(src, e);
            return;
        }
    };
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report.record_failure(src, e);
                continue;
            }
        };
        let path = entry.path();
        let target: PathBuf = dst.join(entry.file_name());
        let Ok(file_type) = entry.file_type() else {
            report.record_failure(&path, "cannot read file type");
            continue;
        };

        if file_type.is_dir() {
            let name = entry.file_name();
            if skip.iter().any(|s| name == *s) || path == install_root {
                report.skipped.push(path);
                continue;
            }
            if let Err(e) = std::fs::create_dir_all(&target) {
                report.record_failure(&path, e);
                continue;
            }
            copy_dir(&path, &target, install_root, skip, report);
        } else if std::fs::metadata(&path).is_ok_and(|meta| meta.is_file()) {
            // Follows symlinks: a link to a regular file is copied as a file.
            match std::fs::copy(&path, &target) {
                Ok(_) => report.copied += 1,
                Err(e) => report.record_failure(&path, e),
            }
        } else {
            tracing::debug!(path = %path.display(), "not a regular file; skipped");
            report.skipped.push(path);
        }
    }
}
