//! CLI argument parsing with clap derive

use std::ffi::OsString;

use anyhow::Result;
use clap::Parser;

use crate::commands;
use crate::output::OutputContext;

/// Flags that take a value, as `--flag value` or `--flag=value`.
const VALUE_FLAGS: &[&str] = &[
    "--repo",
    "--branch",
    "--port",
    "--source-dir",
    "--install-dir",
    "--user",
    "--service-name",
    "--config",
];

/// Flags that take no value.
const SWITCHES: &[&str] = &[
    "--github",
    "--dry-run",
    "--strict",
    "-q",
    "--quiet",
    "--no-color",
    "-v",
    "--verbose",
    "-h",
    "--help",
    "-V",
    "--version",
];

/// Provision the PaddleOCR web service on this host
#[derive(Parser, Debug)]
#[command(
    name = "ocr-provision",
    version,
    after_help = "Must be run as root. Concurrent runs on the same host are not supported.\n\n\
Environment: OCR_PORT, OCR_REPO, OCR_BRANCH, OCR_INSTALL_DIR, OCR_SERVICE_USER,\n\
OCR_SOURCE_DIR, OCR_CONFIG. Unrecognised arguments are ignored with a warning."
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output (any NO_COLOR value other than 0/false/no/off)
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    /// Log every command run (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(flatten)]
    pub provision: commands::provision::ProvisionArgs,
}

impl Cli {
    /// Execute the provisioning run and return the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or a stage fails fatally.
    pub async fn run(self, ctx: &OutputContext, ignored: &[String]) -> Result<i32> {
        commands::provision::run(ctx, &self.provision, ignored).await
    }

    /// Output context for this invocation's color and quiet flags.
    #[must_use]
    pub fn output_context(&self) -> OutputContext {
        OutputContext::new(self.no_color, self.quiet)
    }
}

/// Split raw arguments into ones clap knows and ones to ignore.
///
/// The program name is kept. A value flag keeps the following argument as
/// its value; anything else not in the flag tables (unknown flags, stray
/// positionals, non-UTF-8 input) is returned in the second list.
pub fn split_args(args: impl IntoIterator<Item = OsString>) -> (Vec<OsString>, Vec<String>) {
    let mut args = args.into_iter();
    let mut known: Vec<OsString> = args.next().into_iter().collect();
    let mut ignored = Vec::new();

    while let Some(arg) = args.next() {
        let Some(text) = arg.to_str() else {
            ignored.push(arg.to_string_lossy().into_owned());
            continue;
        };
        if SWITCHES.contains(&text) || is_short_cluster(text) {
            known.push(arg);
        } else if VALUE_FLAGS.contains(&text) {
            known.push(arg);
            if let Some(value) = args.next() {
                known.push(value);
            }
        } else if text
            .split_once('=')
            .is_some_and(|(flag, _)| VALUE_FLAGS.contains(&flag))
        {
            known.push(arg);
        } else {
            ignored.push(text.to_string());
        }
    }
    (known, ignored)
}

/// `-qv` and the like: two or more known short switches behind one dash.
fn is_short_cluster(text: &str) -> bool {
    text.strip_prefix('-')
        .filter(|letters| letters.len() > 1 && !letters.starts_with('-'))
        .is_some_and(|letters| {
            letters
                .chars()
                .all(|c| SWITCHES.contains(&format!("-{c}").as_str()))
        })
}
