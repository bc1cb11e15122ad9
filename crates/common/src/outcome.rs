//! Non-fatal results of best-effort steps.
//!
//! A step that may degrade without aborting the run returns
//! [`Outcome<T>`]. The caller folds it into a [`RunSummary`], which keeps
//! every warning for the closing report instead of discarding it.

use std::fmt;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// A package-manager install step failed.
    DependencyInstall,
    /// A catalog file existed but was not a valid entry sequence.
    RegistryCorrupt,
    /// A configured catalog directory does not exist.
    RegistryLocationMissing,
    /// A catalog could not be read or written.
    RegistryWrite,
    /// The catalog change could not be committed.
    RegistryCommit,
    /// The remote repository could not be created.
    RemoteCreate,
}

impl WarningKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::DependencyInstall => "dependency install",
            Self::RegistryCorrupt => "registry corrupt",
            Self::RegistryLocationMissing => "registry location missing",
            Self::RegistryWrite => "registry write",
            Self::RegistryCommit => "registry commit",
            Self::RemoteCreate => "remote create",
        }
    }

    /// Kinds that describe an expected skip rather than a degradation.
    pub fn is_informational(self) -> bool {
        matches!(self, Self::RegistryLocationMissing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

pub type Outcome<T> = Result<T, Warning>;

/// Warnings accumulated over one scaffolding run.
#[derive(Debug, Default)]
pub struct RunSummary {
    warnings: Vec<Warning>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unwrap a best-effort outcome, keeping its warning if it degraded.
    pub fn record<T>(&mut self, outcome: Outcome<T>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(warning) => {
                self.warn(warning);
                None
            },
        }
    }

    pub fn warn(&mut self, warning: Warning) {
        if warning.kind.is_informational() {
            info!(kind = warning.kind.label(), "{}", warning.message);
        } else {
            warn!(kind = warning.kind.label(), "{}", warning.message);
        }
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            self.warn(warning);
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.iter().all(|w| w.kind.is_informational())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_value_or_warning() {
        let mut summary = RunSummary::new();
        let ok: Outcome<u8> = Ok(3);
        assert_eq!(summary.record(ok), Some(3));
        assert!(summary.is_clean());

        let degraded: Outcome<u8> = Err(Warning::new(WarningKind::DependencyInstall, "npm i"));
        assert_eq!(summary.record(degraded), None);
        assert!(summary.has(WarningKind::DependencyInstall));
        assert!(!summary.is_clean());
        assert_eq!(
            summary.warnings()[0].to_string(),
            "dependency install: npm i"
        );
    }

    #[test]
    fn informational_warnings_keep_summary_clean() {
        let mut summary = RunSummary::new();
        summary.warn(Warning::new(
            WarningKind::RegistryLocationMissing,
            "/nowhere",
        ));
        assert!(summary.is_clean());
        assert_eq!(summary.warnings().len(), 1);
    }
}
