//! Provisioning stages, in execution order.

use std::fmt;

/// One checkpoint of the provisioning pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Privilege,
    Packages,
    Account,
    Acquisition,
    Runtime,
    Ownership,
    Supervisor,
    Activation,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Privilege,
        Stage::Packages,
        Stage::Account,
        Stage::Acquisition,
        Stage::Runtime,
        Stage::Ownership,
        Stage::Supervisor,
        Stage::Activation,
    ];

    /// 1-based position in the pipeline.
    #[must_use]
    pub fn number(self) -> usize {
        self as usize + 1
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Stage::Privilege => "privilege check",
            Stage::Packages => "system packages",
            Stage::Account => "service account",
            Stage::Acquisition => "application source",
            Stage::Runtime => "python environment",
            Stage::Ownership => "ownership and permissions",
            Stage::Supervisor => "systemd unit",
            Stage::Activation => "service activation",
        }
    }

    /// Progress label such as `[3/8] service account`.
    #[must_use]
    pub fn label(self) -> String {
        format!("[{}/{}] {}", self.number(), Self::ALL.len(), self.title())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
