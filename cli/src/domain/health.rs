//! Service health classification and activation outcomes.
//!
//! Pure functions only: no I/O, no async.

use std::time::Duration;

use serde::Deserialize;

/// Number of log lines surfaced when activation does not reach readiness.
pub const DIAGNOSTIC_LINES: usize = 20;

/// Body of `GET /api/health` as served by the OCR web service.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub version: String,
    /// Whether the OCR engine finished loading its models.
    #[serde(default)]
    pub ocr_ready: bool,
}

/// Health status of the running service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy { version: String, ocr_ready: bool },
    Unhealthy { reason: String },
    Unreachable { reason: String },
}

impl HealthStatus {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }
}

/// Classify an HTTP response from the health endpoint.
#[must_use]
pub fn classify(status_code: u16, body: &str) -> HealthStatus {
    if !(200..300).contains(&status_code) {
        return HealthStatus::Unhealthy {
            reason: format!("HTTP {status_code}"),
        };
    }
    match serde_json::from_str::<HealthReport>(body) {
        Ok(report) if report.status == "healthy" => HealthStatus::Healthy {
            version: report.version,
            ocr_ready: report.ocr_ready,
        },
        Ok(report) => HealthStatus::Unhealthy {
            reason: format!("status: {}", report.status),
        },
        Err(e) => HealthStatus::Unhealthy {
            reason: format!("unexpected health response: {e}"),
        },
    }
}

/// Timing of the post-start readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationPolicy {
    /// Blocking wait after `systemctl restart` before the first check.
    pub settle: Duration,
    /// Delay between checks.
    pub interval: Duration,
    /// Give up once this much time has passed since the first check.
    pub timeout: Duration,
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(5),
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Result of the activation stage. `TimedOut` is a warning, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    Ready {
        attempts: u32,
        ocr_ready: bool,
    },
    TimedOut {
        attempts: u32,
        last_status: String,
        diagnostics: Vec<String>,
    },
}

impl ActivationOutcome {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Last `n` non-empty lines of `text`, oldest first.
#[must_use]
pub fn tail_lines(text: &str, n: usize) -> Vec<String> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].iter().map(|l| (*l).to_string()).collect()
}
