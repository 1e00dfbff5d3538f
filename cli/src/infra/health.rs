//! Infrastructure implementation of the `HealthProbe` port over HTTP.

use std::time::Duration;

use provision_common::ServicePort;

use crate::application::ports::HealthProbe;
use crate::domain::HealthStatus;
use crate::domain::health::classify;

/// Path of the service's health endpoint.
pub const HEALTH_PATH: &str = "/api/health";

/// Per-request timeout; a single slow answer must not eat the activation budget.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes `http://<host>:<port>/api/health` with a blocking `ureq` call
/// moved off the runtime thread.
pub struct HttpHealthProbe {
    host: String,
    timeout: Duration,
}

impl HttpHealthProbe {
    #[must_use]
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn url(&self, port: ServicePort) -> String {
        format!("http://{}:{port}{HEALTH_PATH}", self.host)
    }
}

impl Default for HttpHealthProbe {
    fn default() -> Self {
        Self::new("127.0.0.1", PROBE_TIMEOUT)
    }
}

impl HealthProbe for HttpHealthProbe {
    async fn probe(&self, port: ServicePort) -> HealthStatus {
        let url = self.url(port);
        let timeout = self.timeout;
        let result = tokio::task::spawn_blocking(move || fetch(&url, timeout)).await;
        match result {
            Ok(status) => status,
            Err(e) => HealthStatus::Unreachable {
                reason: format!("health probe task failed: {e}"),
            },
        }
    }
}

fn fetch(url: &str, timeout: Duration) -> HealthStatus {
    match ureq::get(url).timeout(timeout).call() {
        Ok(resp) => {
            let code = resp.status();
            match resp.into_string() {
                Ok(body) => classify(code, &body),
                Err(e) => HealthStatus::Unhealthy {
                    reason: format!("reading health response: {e}"),
                },
            }
        }
        Err(ureq::Error::Status(code, resp)) => classify(code, &resp.into_string().unwrap_or_default()),
        Err(ureq::Error::Transport(t)) => HealthStatus::Unreachable {
            reason: t.to_string(),
        },
    }
}
