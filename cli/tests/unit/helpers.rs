//! Shared test helpers: output constructors and scratch install trees.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::time::Duration;

use ocr_provision::application::services::provision::ProvisionOptions;
use ocr_provision::domain::ActivationPolicy;
use provision_common::{InstallSource, ProvisionRequest, ServicePort};
use tempfile::TempDir;

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Scratch host ─────────────────────────────────────────────────────────────

/// A throwaway directory standing in for the host's filesystem.
pub struct Scratch {
    pub root: TempDir,
}

impl Scratch {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("tempdir"),
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    pub fn install_dir(&self) -> PathBuf {
        self.path("opt/paddleocr")
    }

    pub fn unit_dir(&self) -> PathBuf {
        self.path("etc/systemd/system")
    }

    /// A checkout of the OCR service under `src/`, with VCS and venv noise.
    pub fn source_tree(&self, with_requirements: bool) -> PathBuf {
        let src = self.path("src");
        write(&src.join("app.py"), "from flask import Flask\n");
        write(&src.join("templates/index.html"), "<html></html>");
        write(&src.join("static/app.js"), "");
        write(&src.join(".git/HEAD"), "ref: refs/heads/main\n");
        write(&src.join("venv/bin/python"), "");
        write(&src.join("__pycache__/app.cpython-311.pyc"), "");
        if with_requirements {
            write(&src.join("requirements.txt"), "flask\npaddleocr\n");
        }
        src
    }

    pub fn options(&self) -> ProvisionOptions {
        ProvisionOptions {
            unit_dir: self.unit_dir(),
            activation: instant_policy(),
        }
    }

    pub fn local_request(&self, source: &Path, port: u16) -> ProvisionRequest {
        ProvisionRequest {
            source: InstallSource::Local {
                path: source.to_path_buf(),
            },
            install_dir: self.install_dir(),
            service_port: ServicePort::try_from(port).expect("valid port"),
            service_user: "paddleocr".to_string(),
            service_name: "paddleocr".to_string(),
        }
    }

    pub fn remote_request(&self, branch: &str) -> ProvisionRequest {
        ProvisionRequest {
            source: InstallSource::Remote {
                repo: "paddleocr-web/ocr-service".to_string(),
                branch: branch.to_string(),
            },
            ..self.local_request(Path::new("/unused"), 8000)
        }
    }
}

/// Activation policy with no waiting: exactly one readiness check.
pub fn instant_policy() -> ActivationPolicy {
    ActivationPolicy {
        settle: Duration::ZERO,
        interval: Duration::ZERO,
        timeout: Duration::ZERO,
    }
}

pub fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
    std::fs::write(path, content).expect("write");
}
