//! Provision command: resolve the request, then run (or plan) the pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use provision_common::ProvisionRequest;

use crate::application::services::provision::{
    Host, ProvisionOptions, ProvisionResult, plan, provision,
};
use crate::domain::ActivationOutcome;
use crate::domain::config::{EnvOverrides, FlagOverrides, ProvisionFile, resolve};
use crate::domain::unit::{UnitSpec, render};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::{load_env, load_provision_file};
use crate::infra::fs::LocalFs;
use crate::infra::health::HttpHealthProbe;
use crate::output::{OutputContext, TerminalReporter};

/// Exit code of a run whose service did not become healthy under `--strict`.
pub const EXIT_DEGRADED: i32 = 3;

/// Arguments for a provisioning run.
#[derive(Args, Debug, Default)]
pub struct ProvisionArgs {
    /// Fetch the application from GitHub instead of a local directory
    #[arg(long)]
    pub github: bool,

    /// GitHub repository (owner/name) used with --github
    #[arg(long, value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// Branch to fetch with --github
    #[arg(long, value_name = "NAME")]
    pub branch: Option<String>,

    /// Port the service listens on (1-65535)
    #[arg(long, value_name = "PORT")]
    pub port: Option<String>,

    /// Local application source [default: current directory]
    #[arg(long, value_name = "PATH")]
    pub source_dir: Option<PathBuf>,

    /// Install directory [default: /opt/paddleocr]
    #[arg(long, value_name = "PATH")]
    pub install_dir: Option<PathBuf>,

    /// Service account name [default: paddleocr]
    #[arg(long, value_name = "NAME")]
    pub user: Option<String>,

    /// systemd service name [default: paddleocr]
    #[arg(long, value_name = "NAME")]
    pub service_name: Option<String>,

    /// YAML provision file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Validate and print the plan and unit file without changing the host
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with status 3 if the service does not become healthy
    #[arg(long)]
    pub strict: bool,
}

impl ProvisionArgs {
    fn flag_overrides(&self) -> FlagOverrides {
        FlagOverrides {
            github: self.github,
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            port: self.port.clone(),
            source_dir: self.source_dir.clone(),
            install_dir: self.install_dir.clone(),
            service_user: self.user.clone(),
            service_name: self.service_name.clone(),
        }
    }
}

/// Entry point of a provisioning run.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a stage fails.
pub async fn run(ctx: &OutputContext, args: &ProvisionArgs, ignored: &[String]) -> Result<i32> {
    for arg in ignored {
        tracing::warn!(%arg, "ignoring unrecognised argument");
    }

    let env = load_env()?;
    let req = resolve_request(args, &env)?;
    let opts = ProvisionOptions::default();

    if args.dry_run {
        print_plan(ctx, &req, &opts);
        return Ok(0);
    }

    ctx.header(&format!(
        "Provisioning {} ({}) on port {}",
        req.service_name, req.source, req.service_port
    ));
    let runner = TokioCommandRunner::default();
    let health = HttpHealthProbe::default();
    let host = Host {
        runner: &runner,
        fs: &LocalFs,
        health: &health,
    };
    let reporter = TerminalReporter::new(ctx);
    let result = provision(&req, &host, &reporter, &opts).await;
    reporter.finish();

    let result = result.map_err(|e| {
        let stage = e.stage().label();
        anyhow::Error::new(e).context(format!("{stage} failed"))
    })?;
    Ok(render_summary(ctx, &req, &result, args.strict))
}

/// Layer provision file, environment and flags into a validated request.
///
/// # Errors
///
/// Returns an error if the provision file cannot be loaded or a value is invalid.
pub fn resolve_request(args: &ProvisionArgs, env: &EnvOverrides) -> Result<ProvisionRequest> {
    let file = match args.config.as_ref().or(env.config.as_ref()) {
        Some(path) => load_provision_file(path)?,
        None => ProvisionFile::default(),
    };
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    resolve(&file, env, &args.flag_overrides(), &cwd).context("invalid configuration")
}

fn print_plan(ctx: &OutputContext, req: &ProvisionRequest, opts: &ProvisionOptions) {
    ctx.header("Dry run: no changes will be made");
    for line in plan(req, opts) {
        ctx.info(&line);
    }
    if !ctx.quiet {
        println!();
        print!("{}", render(&UnitSpec::from_request(req)));
    }
}

fn render_summary(
    ctx: &OutputContext,
    req: &ProvisionRequest,
    result: &ProvisionResult,
    strict: bool,
) -> i32 {
    if let Some(report) = &result.copy_report
        && !report.is_clean()
    {
        ctx.warn(&format!("{} files could not be copied", report.failures.len()));
    }

    match &result.activation {
        ActivationOutcome::Ready { ocr_ready, .. } => {
            ctx.success(&format!(
                "{} is running at http://0.0.0.0:{}",
                req.service_name, req.service_port
            ));
            if !ocr_ready {
                ctx.info("OCR models are still loading; first requests may be slow");
            }
        }
        ActivationOutcome::TimedOut {
            attempts,
            last_status,
            diagnostics,
        } => {
            tracing::warn!(service = %req.service_name, attempts, %last_status, "service not healthy");
            ctx.warn(&format!(
                "{} did not report healthy after {attempts} checks: {last_status}",
                req.service_name
            ));
            if !diagnostics.is_empty() {
                ctx.info("recent logs:");
                ctx.excerpt(diagnostics);
            }
        }
    }

    ctx.kv("unit", &result.unit.path.display().to_string());
    ctx.kv("logs", &req.logs_dir().display().to_string());
    ctx.kv("status", &format!("systemctl status {}", req.service_name));

    if result.is_degraded() && strict {
        EXIT_DEGRADED
    } else {
        0
    }
}
