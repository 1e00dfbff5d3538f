//! systemd unit generation: pure functions, no I/O, no async.
//!
//! The caller is responsible for writing the unit to disk and reloading
//! systemd.

#![allow(clippy::format_push_string)]

use std::path::{Path, PathBuf};

use provision_common::{ProvisionRequest, ServicePort};

/// Entry point of the OCR web service inside the install directory.
pub const ENTRY_POINT: &str = "app.py";

/// Address the service binds; the health probe targets loopback.
pub const BIND_HOST: &str = "0.0.0.0";

/// Seconds systemd waits before restarting a crashed service.
pub const RESTART_SEC: u32 = 10;

/// Open file descriptor ceiling.
pub const LIMIT_NOFILE: u32 = 65536;

/// Memory ceiling; Paddle models are large but should never exceed this.
pub const MEMORY_MAX: &str = "4G";

/// Everything that varies between rendered units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSpec {
    pub description: String,
    pub user: String,
    pub working_dir: PathBuf,
    pub venv_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub port: ServicePort,
}

impl UnitSpec {
    #[must_use]
    pub fn from_request(req: &ProvisionRequest) -> Self {
        Self {
            description: "PaddleOCR Web Service".to_string(),
            user: req.service_user.clone(),
            working_dir: req.install_dir.clone(),
            venv_dir: req.venv_dir(),
            logs_dir: req.logs_dir(),
            port: req.service_port,
        }
    }

    /// `ExecStart=` command line.
    #[must_use]
    pub fn exec_start(&self) -> String {
        format!(
            "{} {} --host {BIND_HOST} --port {}",
            self.venv_dir.join("bin").join("python").display(),
            self.working_dir.join(ENTRY_POINT).display(),
            self.port,
        )
    }
}

/// Path of the unit file for `service_name` under `unit_dir`.
#[must_use]
pub fn unit_path(unit_dir: &Path, service_name: &str) -> PathBuf {
    unit_dir.join(format!("{service_name}.service"))
}

/// Render the `<name>.service` content with restart policy, resource
/// ceilings and baseline sandboxing.
#[must_use]
pub fn render(spec: &UnitSpec) -> String {
    let venv_bin = spec.venv_dir.join("bin");
    let logs = &spec.logs_dir;

    let mut out = String::new();
    out.push_str("# Generated by ocr-provision - DO NOT EDIT\n");
    out.push_str("[Unit]\n");
    out.push_str(&format!("Description={}\n", spec.description));
    out.push_str("After=network-online.target\n");
    out.push_str("Wants=network-online.target\n");
    out.push('\n');
    out.push_str("[Service]\n");
    out.push_str("Type=simple\n");
    out.push_str(&format!("User={}\n", spec.user));
    out.push_str(&format!("Group={}\n", spec.user));
    out.push_str(&format!("WorkingDirectory={}\n", spec.working_dir.display()));
    out.push_str(&format!(
        "Environment=\"PATH={}:/usr/local/bin:/usr/bin:/bin\"\n",
        venv_bin.display()
    ));
    out.push_str("Environment=PYTHONUNBUFFERED=1\n");
    out.push_str(&format!("ExecStart={}\n", spec.exec_start()));
    out.push('\n');
    out.push_str("Restart=always\n");
    out.push_str(&format!("RestartSec={RESTART_SEC}\n"));
    out.push('\n');
    out.push_str(&format!("LimitNOFILE={LIMIT_NOFILE}\n"));
    out.push_str(&format!("MemoryMax={MEMORY_MAX}\n"));
    out.push('\n');
    out.push_str("NoNewPrivileges=true\n");
    out.push_str("PrivateTmp=true\n");
    out.push('\n');
    out.push_str(&format!(
        "StandardOutput=append:{}\n",
        logs.join("service.log").display()
    ));
    out.push_str(&format!(
        "StandardError=append:{}\n",
        logs.join("error.log").display()
    ));
    out.push('\n');
    out.push_str("[Install]\n");
    out.push_str("WantedBy=multi-user.target\n");

    out
}
