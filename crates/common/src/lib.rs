//! Shared error definitions, the external-command collaborator, and the
//! non-fatal outcome types used across all microlab crates.

pub mod command;
pub mod error;
pub mod outcome;

pub use {
    command::{CommandRunner, Invocation, SystemRunner},
    error::{Error, FromMessage, Result},
    outcome::{Outcome, RunSummary, Warning, WarningKind},
};
