//! Stage 3: dedicated, non-login service account.

use std::path::Path;

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::domain::ProvisionError;

use super::run_checked;

/// Shell assigned to the service account.
pub const NOLOGIN_SHELL: &str = "/usr/sbin/nologin";

/// Whether the account had to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOutcome {
    Created,
    Existing,
}

/// Ensure `user` exists as a system account homed at `install_dir`.
///
/// An existing account is left exactly as it is.
///
/// # Errors
///
/// Returns `ProvisionError::Account` if `useradd` fails.
pub async fn ensure_account(
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
    user: &str,
    install_dir: &Path,
) -> Result<AccountOutcome, ProvisionError> {
    let exists = runner
        .run("id", &["-u", user])
        .await
        .is_ok_and(|o| o.status.success());
    if exists {
        tracing::debug!(user, "service account already present");
        reporter.info(&format!("service account '{user}' already exists"));
        return Ok(AccountOutcome::Existing);
    }

    reporter.step(&format!("creating service account '{user}'..."));
    let home = install_dir.to_string_lossy();
    run_checked(
        runner,
        "useradd",
        &[
            "--system",
            "--no-create-home",
            "--home-dir",
            &home,
            "--shell",
            NOLOGIN_SHELL,
            "--user-group",
            user,
        ],
        None,
    )
    .await
    .map_err(|detail| ProvisionError::Account {
        user: user.to_string(),
        detail,
    })?;
    reporter.success(&format!("service account '{user}' created"));
    Ok(AccountOutcome::Created)
}
