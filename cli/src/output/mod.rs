//! Terminal output for a provisioning run.

pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use reporter::TerminalReporter;
pub use styles::{Mark, Styles};

/// Width the keys of the closing summary are padded to.
const KEY_WIDTH: usize = 8;

/// Styling and terminal state shared by everything that prints.
pub struct OutputContext {
    pub styles: Styles,
    /// Whether stdout is a terminal.
    pub is_tty: bool,
    /// Suppress everything except errors.
    pub quiet: bool,
}

impl OutputContext {
    /// `no_color` already folds in `NO_COLOR` (clap reads it for `--no-color`).
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let styles = if !no_color && is_tty {
            Styles::colored()
        } else {
            Styles::default()
        };
        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Spinners only make sense on an interactive, non-quiet terminal.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Format `  <symbol> <msg>` with the symbol coloured.
    #[must_use]
    pub fn marked(&self, mark: Mark, msg: &str) -> String {
        format!("  {} {msg}", mark.symbol().style(self.styles.mark(mark)))
    }

    fn emit(&self, mark: Mark, msg: &str) {
        if !self.quiet {
            println!("{}", self.marked(mark, msg));
        }
    }

    pub fn success(&self, msg: &str) {
        self.emit(Mark::Ok, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.emit(Mark::Warn, msg);
    }

    pub fn info(&self, msg: &str) {
        self.emit(Mark::Note, msg);
    }

    /// Written to stderr and printed even when quiet.
    pub fn error(&self, msg: &str) {
        eprintln!("{}", self.marked(Mark::Fail, msg));
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.title));
        }
    }

    /// One line of the closing summary, e.g. `unit     /etc/systemd/system/x.service`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            let key = format!("{key:<KEY_WIDTH$}");
            println!("  {} {value}", key.style(self.styles.muted));
        }
    }

    /// Indented log lines under a warning.
    pub fn excerpt(&self, lines: &[String]) {
        if self.quiet {
            return;
        }
        for line in lines {
            println!("    {}", line.style(self.styles.muted));
        }
    }
}
