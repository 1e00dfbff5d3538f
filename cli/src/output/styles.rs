//! Status marks and their colours.

use owo_colors::Style;

/// Leading symbol of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Step,
    Ok,
    Warn,
    Fail,
    Note,
}

impl Mark {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Mark::Step => "→",
            Mark::Ok => "✓",
            Mark::Warn => "⚠",
            Mark::Fail => "✗",
            Mark::Note => "ℹ",
        }
    }
}

/// Stylesheet for terminal output. `Default` is uncoloured.
#[derive(Default, Clone)]
pub struct Styles {
    step: Style,
    ok: Style,
    warn: Style,
    fail: Style,
    note: Style,
    /// Keys, log excerpts.
    pub muted: Style,
    pub title: Style,
}

impl Styles {
    #[must_use]
    pub fn colored() -> Self {
        Self {
            step: Style::new().cyan(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red(),
            note: Style::new().blue(),
            muted: Style::new().dimmed(),
            title: Style::new().bold().cyan(),
        }
    }

    #[must_use]
    pub fn mark(&self, mark: Mark) -> Style {
        match mark {
            Mark::Step => self.step,
            Mark::Ok => self.ok,
            Mark::Warn => self.warn,
            Mark::Fail => self.fail,
            Mark::Note => self.note,
        }
    }
}
