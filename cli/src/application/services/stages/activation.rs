//! Stage 8: enable, (re)start and wait for the service to report healthy.
//!
//! Never fatal: when readiness is not reached in time the outcome carries
//! the last observed status and recent log lines instead.

use tokio::time::{Instant, sleep};

use provision_common::ProvisionRequest;

use crate::application::ports::{CommandRunner, HealthProbe, HostFs, ProgressReporter};
use crate::domain::health::{DIAGNOSTIC_LINES, tail_lines};
use crate::domain::{ActivationOutcome, ActivationPolicy, HealthStatus};

use super::run_checked;

/// Enable and restart the unit, then poll until healthy or `policy.timeout`.
///
/// `restart` starts a stopped unit and replaces a running one, so a re-run
/// serves the freshly acquired code and the rewritten unit.
pub async fn activate(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    health: &impl HealthProbe,
    reporter: &impl ProgressReporter,
    req: &ProvisionRequest,
    policy: ActivationPolicy,
) -> ActivationOutcome {
    let name = req.service_name.as_str();

    for verb in ["enable", "restart"] {
        if let Err(detail) = run_checked(runner, "systemctl", &[verb, name], None).await {
            tracing::warn!(service = name, verb, %detail, "systemctl failed");
            reporter.warn(&format!("systemctl {verb} {name} failed"));
            return ActivationOutcome::TimedOut {
                attempts: 0,
                last_status: detail,
                diagnostics: collect_diagnostics(runner, fs, req).await,
            };
        }
    }

    reporter.step(&format!("waiting for {name} on port {}...", req.service_port));
    sleep(policy.settle).await;

    let start = Instant::now();
    let mut attempts = 0;
    loop {
        attempts += 1;
        match check_once(runner, health, req).await {
            Ok(ocr_ready) => {
                tracing::info!(service = name, attempts, ocr_ready, "service is healthy");
                reporter.success(&format!("{name} is healthy on port {}", req.service_port));
                if !ocr_ready {
                    reporter.info("OCR engine is still loading its models");
                }
                return ActivationOutcome::Ready { attempts, ocr_ready };
            }
            Err(status) => {
                tracing::debug!(service = name, attempts, %status, "not ready yet");
                if start.elapsed() >= policy.timeout {
                    reporter.warn(&format!(
                        "{name} did not become healthy within {}s ({status})",
                        policy.timeout.as_secs()
                    ));
                    return ActivationOutcome::TimedOut {
                        attempts,
                        last_status: status,
                        diagnostics: collect_diagnostics(runner, fs, req).await,
                    };
                }
            }
        }
        sleep(policy.interval).await;
    }
}

/// One readiness check: the unit must be active and the health endpoint
/// must answer healthy. Returns `ocr_ready` on success, the observed status
/// otherwise.
pub async fn check_once(
    runner: &impl CommandRunner,
    health: &impl HealthProbe,
    req: &ProvisionRequest,
) -> Result<bool, String> {
    let state = match runner.run("systemctl", &["is-active", &req.service_name]).await {
        Ok(output) => String::from_utf8_lossy(&output.stdout).trim().to_string(),
        Err(e) => return Err(format!("{e:#}")),
    };
    if state != "active" {
        return Err(format!(
            "unit {}",
            if state.is_empty() { "unknown" } else { &state }
        ));
    }
    match health.probe(req.service_port).await {
        HealthStatus::Healthy { ocr_ready, .. } => Ok(ocr_ready),
        HealthStatus::Unhealthy { reason } | HealthStatus::Unreachable { reason } => Err(reason),
    }
}

/// Recent journal entries for the unit followed by the tail of its error log.
pub async fn collect_diagnostics(
    runner: &impl CommandRunner,
    fs: &impl HostFs,
    req: &ProvisionRequest,
) -> Vec<String> {
    let mut lines = Vec::new();
    let count = DIAGNOSTIC_LINES.to_string();
    match runner
        .run("journalctl", &["-u", &req.service_name, "-n", &count, "--no-pager"])
        .await
    {
        Ok(output) if output.status.success() => {
            lines.extend(tail_lines(&String::from_utf8_lossy(&output.stdout), DIAGNOSTIC_LINES));
        }
        Ok(_) | Err(_) => tracing::debug!(service = %req.service_name, "journal unavailable"),
    }
    let error_log = req.logs_dir().join("error.log");
    if let Ok(text) = fs.read_to_string(&error_log) {
        lines.extend(
            tail_lines(&text, DIAGNOSTIC_LINES)
                .into_iter()
                .map(|l| format!("error.log: {l}")),
        );
    }
    lines
}
