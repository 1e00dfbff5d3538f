//! ocr-provision - Bring up the PaddleOCR web service on a Debian/Ubuntu host

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;
use console::Term;
use ocr_provision::cli::{Cli, split_args};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool, no_color: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_ansi(!no_color && Term::stderr().is_term())
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let (known, ignored) = split_args(std::env::args_os());
    let cli = Cli::parse_from(known);
    init_tracing(cli.verbose, cli.no_color);
    let ctx = cli.output_context();

    match cli.run(&ctx, &ignored).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            ctx.error(&format!("Error: {e:#}"));
            std::process::exit(1);
        }
    }
}
