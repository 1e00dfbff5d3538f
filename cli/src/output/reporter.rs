//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{Mark, OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// On a TTY, `step()` drives a spinner that the next `success()` resolves
/// into a `✓` line. Otherwise every event is printed as its own line:
///
/// - `step()` prints `"  → {message}"`
/// - `success()` prints `"  ✓ {message}"`
/// - `warn()` prints `"  ⚠ {message}"`
/// - `info()` prints `"  ℹ {message}"`
///
/// Everything is suppressed when `ctx.quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: RefCell::new(None),
        }
    }

    /// Clear any spinner still on screen.
    pub fn finish(&self) {
        if let Some(pb) = self.spinner.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }

    /// Print a line without tearing an active spinner.
    fn line(&self, text: &str) {
        match self.spinner.borrow().as_ref() {
            Some(pb) => pb.suspend(|| println!("{text}")),
            None => println!("{text}"),
        }
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if !self.ctx.show_progress() {
            println!("{}", self.ctx.marked(Mark::Step, message));
            return;
        }
        let mut slot = self.spinner.borrow_mut();
        match slot.as_ref() {
            Some(pb) => pb.set_message(message.to_string()),
            None => *slot = Some(progress::spinner(message)),
        }
    }

    fn success(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        match self.spinner.borrow_mut().take() {
            Some(pb) => {
                let symbol = Mark::Ok
                    .symbol()
                    .style(self.ctx.styles.mark(Mark::Ok))
                    .to_string();
                progress::finish_with(&pb, &symbol, message);
            }
            None => println!("{}", self.ctx.marked(Mark::Ok, message)),
        }
    }

    fn warn(&self, message: &str) {
        if !self.ctx.quiet {
            self.line(&self.ctx.marked(Mark::Warn, message));
        }
    }

    fn info(&self, message: &str) {
        if !self.ctx.quiet {
            self.line(&self.ctx.marked(Mark::Note, message));
        }
    }
}
