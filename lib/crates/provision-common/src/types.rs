use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// Subdirectories the OCR service expects under its install directory.
pub const REQUIRED_SUBDIRS: &[&str] = &["templates", "static", "uploads", "logs"];

/// Top-level directories that may never be used as an install target.
const PROTECTED_DIRS: &[&str] = &[
    "bin", "boot", "dev", "etc", "home", "lib", "lib32", "lib64", "media", "mnt", "opt", "proc",
    "root", "run", "sbin", "srv", "sys", "tmp", "usr", "var",
];

/// Trees owned by the OS or the package manager; neither they nor anything
/// below them is a valid target.
const SEALED_TREES: &[&str] = &[
    "bin", "boot", "dev", "etc", "lib", "lib32", "lib64", "proc", "run", "sbin", "sys",
    "usr/bin", "usr/include", "usr/lib", "usr/lib32", "usr/lib64", "usr/libexec", "usr/sbin",
    "usr/share", "usr/src",
    "usr/local/bin", "usr/local/etc", "usr/local/games", "usr/local/include", "usr/local/lib",
    "usr/local/lib64", "usr/local/libexec", "usr/local/man", "usr/local/sbin", "usr/local/share",
    "var/backups", "var/cache", "var/lib/apt", "var/lib/dpkg", "var/lib/systemd", "var/lib/ucf",
    "var/log", "var/mail", "var/spool",
];

/// Trees whose immediate children are system-owned or belong to someone
/// else (`/usr/local`, `/var/lib`, `/home/alice`).
const SYSTEM_PARENTS: &[&str] = &["home", "usr", "var"];

/// Canonical decimal port text: no sign, no leading zeros.
static PORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[1-9][0-9]{0,4}$").expect("valid regex")
});

/// GitHub `owner/name`.
static REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$").expect("valid regex")
});

/// Ref name that git cannot read as an option: no leading `-`, no
/// whitespace or control characters.
static BRANCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[^-\s\p{Cc}][^\s\p{Cc}]{0,254}$").expect("valid regex")
});

/// POSIX-portable user and unit name, as `useradd` accepts by default.
pub static ACCOUNT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z_][a-z0-9_-]{0,31}$").expect("valid regex")
});

/// Where the application code comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallSource {
    /// Copy from a directory on this host.
    Local { path: PathBuf },
    /// Shallow-fetch a branch of a GitHub repository.
    Remote { repo: String, branch: String },
}

impl InstallSource {
    /// Validate the remote identifier and branch (local paths are checked at copy time).
    pub fn validate(&self) -> Result<(), RequestError> {
        match self {
            Self::Local { .. } => Ok(()),
            Self::Remote { repo, branch } => {
                validate_repo(repo)?;
                validate_branch(branch)
            }
        }
    }

    /// HTTPS clone URL for a remote source, `None` for a local one.
    #[must_use]
    pub fn clone_url(&self) -> Option<String> {
        match self {
            Self::Local { .. } => None,
            Self::Remote { repo, .. } => Some(format!("https://github.com/{repo}.git")),
        }
    }
}

impl fmt::Display for InstallSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { path } => write!(f, "local {}", path.display()),
            Self::Remote { repo, branch } => write!(f, "github {repo}@{branch}"),
        }
    }
}

/// TCP port the OCR service binds, always within 1..=65535.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ServicePort(u16);

impl ServicePort {
    /// Parse a port from user input, rejecting anything that is not a plain
    /// decimal number in range. Surrounding whitespace is ignored; leading
    /// zeros are not accepted.
    pub fn parse(input: &str) -> Result<Self, RequestError> {
        let trimmed = input.trim();
        if !PORT_RE.is_match(trimmed) {
            return Err(RequestError::InvalidPort(input.to_string()));
        }
        trimmed
            .parse::<u16>()
            .ok()
            .and_then(|n| Self::try_from(n).ok())
            .ok_or_else(|| RequestError::InvalidPort(input.to_string()))
    }

    #[must_use]
    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for ServicePort {
    type Error = RequestError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value == 0 {
            return Err(RequestError::InvalidPort(value.to_string()));
        }
        Ok(Self(value))
    }
}

impl From<ServicePort> for u16 {
    fn from(port: ServicePort) -> Self {
        port.0
    }
}

impl fmt::Display for ServicePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Everything needed to drive one provisioning run.
///
/// Built once from defaults, the provision file, the environment and the
/// command line, then handed to the provisioner by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub source: InstallSource,
    pub install_dir: PathBuf,
    pub service_port: ServicePort,
    /// Unprivileged account the service runs as and that owns the install.
    pub service_user: String,
    /// Name of the supervisor unit (`<name>.service`).
    pub service_name: String,
}

impl ProvisionRequest {
    /// Check every invariant of the request.
    pub fn validate(&self) -> Result<(), RequestError> {
        self.source.validate()?;
        validate_install_dir(&self.install_dir)?;
        validate_account_name("service user", &self.service_user)?;
        validate_account_name("service name", &self.service_name)
    }

    /// Path of the isolated interpreter environment.
    #[must_use]
    pub fn venv_dir(&self) -> PathBuf {
        self.install_dir.join("venv")
    }

    /// Path of the service log directory.
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.install_dir.join("logs")
    }
}

/// Reject install targets that would clobber the OS.
pub fn validate_install_dir(path: &Path) -> Result<(), RequestError> {
    let reject = |reason| {
        Err(RequestError::InvalidInstallDir {
            path: path.to_path_buf(),
            reason,
        })
    };

    if !path.is_absolute() {
        return reject("must be an absolute path");
    }
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::RootDir => {}
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            _ => return reject("must not contain '.' or '..' components"),
        }
    }

    let rel = parts.join("/");
    let sealed = SEALED_TREES
        .iter()
        .any(|tree| rel == *tree || rel.strip_prefix(tree).is_some_and(|rest| rest.starts_with('/')));

    match parts.as_slice() {
        [] => reject("must not be the filesystem root"),
        [top] if PROTECTED_DIRS.contains(&top.as_ref()) => reject("is a system directory"),
        _ if sealed => reject("lies inside a system directory"),
        [top, _] if SYSTEM_PARENTS.contains(&top.as_ref()) => reject("is a system directory"),
        _ => Ok(()),
    }
}

/// `owner/name` with GitHub's permitted characters; `.` and `..` are not names.
pub fn validate_repo(repo: &str) -> Result<(), RequestError> {
    let valid = REPO_RE.captures(repo).is_some_and(|caps| {
        caps.iter()
            .skip(1)
            .flatten()
            .all(|part| !matches!(part.as_str(), "." | ".."))
    });
    if valid {
        Ok(())
    } else {
        Err(RequestError::InvalidRepo(repo.to_string()))
    }
}

/// Loose git ref-name check: enough to keep the value from being read as a flag.
pub fn validate_branch(branch: &str) -> Result<(), RequestError> {
    if BRANCH_RE.is_match(branch) && !branch.contains("..") {
        Ok(())
    } else {
        Err(RequestError::InvalidBranch(branch.to_string()))
    }
}

/// POSIX-portable account / unit name, see [`ACCOUNT_NAME_RE`].
pub fn validate_account_name(kind: &'static str, value: &str) -> Result<(), RequestError> {
    if ACCOUNT_NAME_RE.is_match(value) {
        Ok(())
    } else {
        Err(RequestError::InvalidAccountName {
            kind,
            value: value.to_string(),
        })
    }
}
