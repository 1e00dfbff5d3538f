//! The individual provisioning stages.
//!
//! Each module implements one checkpoint of the pipeline and imports only
//! from `crate::domain` and `crate::application::ports`.

pub mod account;
pub mod acquire;
pub mod activation;
pub mod ownership;
pub mod packages;
pub mod privilege;
pub mod runtime;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod test_support;

use std::process::Output;
use std::time::Duration;

use crate::application::ports::CommandRunner;

/// Describe a failed command: stderr, else stdout, else the exit status.
pub(crate) fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return stderr.trim().to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        return stdout.trim().to_string();
    }
    match output.status.code() {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by a signal".to_string(),
    }
}

/// Run a command and require a zero exit status.
///
/// `timeout` overrides the runner's default. The error is a human-readable
/// detail string for the caller to wrap in its stage's error.
pub(crate) async fn run_checked(
    runner: &impl CommandRunner,
    program: &str,
    args: &[&str],
    timeout: Option<Duration>,
) -> Result<Output, String> {
    tracing::debug!(program, ?args, "running command");
    let result = match timeout {
        Some(t) => runner.run_with_timeout(program, args, t).await,
        None => runner.run(program, args).await,
    };
    match result {
        Ok(output) if output.status.success() => Ok(output),
        Ok(output) => Err(format!("{program}: {}", failure_detail(&output))),
        Err(e) => Err(format!("{e:#}")),
    }
}
