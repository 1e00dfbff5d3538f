//! Integration tests for argument handling, configuration layering and
//! dry-run output.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const OCR_VARS: &[&str] = &[
    "OCR_PORT",
    "OCR_REPO",
    "OCR_BRANCH",
    "OCR_INSTALL_DIR",
    "OCR_SERVICE_USER",
    "OCR_SOURCE_DIR",
    "OCR_CONFIG",
];

fn ocr_provision() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ocr-provision"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    for var in OCR_VARS {
        cmd.env_remove(var);
    }
    cmd
}

// --- Help and version tests ---

#[test]
fn test_help_flag_shows_usage_and_flags() {
    ocr_provision()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--github"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("Concurrent runs"));
}

#[test]
fn test_short_help_flag() {
    ocr_provision()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag_shows_version() {
    ocr_provision()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ocr-provision 0.1.0"));
}

// --- Dry run ---

#[test]
fn test_dry_run_renders_unit_for_requested_port() {
    let src = TempDir::new().unwrap();
    ocr_provision()
        .args(["--dry-run", "--port", "9000", "--source-dir"])
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("--port 9000"))
        .stdout(predicate::str::contains("[8/8] service activation"))
        .stdout(predicate::str::contains("ExecStart=/opt/paddleocr/venv/bin/python"));
}

#[test]
fn test_dry_run_remote_source() {
    ocr_provision()
        .args(["--dry-run", "--github", "--repo=acme/ocr", "--branch", "release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("clone github acme/ocr@release into /opt/paddleocr"));
}

#[test]
fn test_dry_run_defaults_to_port_8000() {
    ocr_provision()
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("--port 8000"));
}

// --- Unknown arguments ---

#[test]
fn test_unknown_flag_is_ignored_with_warning() {
    ocr_provision()
        .args(["--foo", "stray", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("ignoring unrecognised argument"))
        .stderr(predicate::str::contains("--foo"))
        .stdout(predicate::str::contains("Dry run"));
}

#[test]
fn test_combined_short_switches_are_accepted() {
    ocr_provision()
        .args(["-qv", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("ignoring unrecognised argument").not());
}

// --- NO_COLOR ---

#[test]
fn test_no_color_accepts_any_conventional_value() {
    for value in ["1", "yes", "true", "0", ""] {
        ocr_provision()
            .env("NO_COLOR", value)
            .arg("--dry-run")
            .assert()
            .success()
            .stdout(predicate::str::contains("Dry run"))
            .stdout(predicate::str::contains("\x1b[").not());
    }
}

// --- Validation failures ---

#[test]
fn test_fatal_error_is_marked_on_stderr() {
    ocr_provision()
        .args(["--dry-run", "--port", "abc"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("  ✗ Error: invalid configuration"))
        .stderr(predicate::str::contains("Invalid port 'abc'"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_non_numeric_port_is_fatal() {
    ocr_provision()
        .args(["--dry-run", "--port", "abc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid port 'abc'"));
}

#[test]
fn test_out_of_range_port_is_fatal() {
    ocr_provision()
        .args(["--dry-run", "--port=70000"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid port"));
}

#[test]
fn test_port_without_value_is_a_usage_error() {
    ocr_provision().arg("--port").assert().code(2);
}

#[test]
fn test_invalid_repo_is_fatal() {
    ocr_provision()
        .args(["--dry-run", "--github", "--repo", "not a repo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid repository"));
}

#[test]
fn test_system_install_dir_is_rejected() {
    ocr_provision()
        .args(["--dry-run", "--install-dir", "/etc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid install directory"));
}

// --- Configuration layering ---

#[test]
fn test_env_port_is_used() {
    ocr_provision()
        .env("OCR_PORT", "7100")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("--port 7100"));
}

#[test]
fn test_flag_port_beats_env_port() {
    ocr_provision()
        .env("OCR_PORT", "7100")
        .args(["--dry-run", "--port", "9100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port 9100"))
        .stdout(predicate::str::contains("--port 7100").not());
}

#[test]
fn test_invalid_env_port_is_fatal() {
    ocr_provision()
        .env("OCR_PORT", "0")
        .arg("--dry-run")
        .assert()
        .code(1);
}

#[test]
fn test_config_file_is_applied() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("provision.yaml");
    std::fs::write(
        &path,
        "install_dir: /opt/ocr\nservice_user: ocrsvc\nport: 8200\nsource:\n  remote:\n    repo: acme/ocr\n    branch: main\n",
    )
    .unwrap();

    ocr_provision()
        .args(["--dry-run", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("--port 8200"))
        .stdout(predicate::str::contains("User=ocrsvc"))
        .stdout(predicate::str::contains("WorkingDirectory=/opt/ocr"))
        .stdout(predicate::str::contains("clone github acme/ocr@main"));
}

#[test]
fn test_config_file_from_env() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("provision.yaml");
    std::fs::write(&path, "port: 8300\n").unwrap();

    ocr_provision()
        .env("OCR_CONFIG", &path)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("--port 8300"));
}

#[test]
fn test_malformed_config_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("provision.yaml");
    std::fs::write(&path, "prot: 8000\n").unwrap();

    ocr_provision()
        .args(["--dry-run", "--config"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}
