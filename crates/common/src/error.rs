use thiserror::Error;

/// Failures of the external-command collaborator.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// The program could not be started at all.
    #[error("failed to execute `{command}`: {source}")]
    CommandExecution {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("`{command}` failed: {status}")]
    CommandFailed { command: String, status: String },
}

impl Error {
    #[must_use]
    pub fn command_execution(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandExecution {
            command: command.into(),
            source,
        }
    }

    #[must_use]
    pub fn command_failed(command: impl Into<String>, status: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            status: status.into(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// ── Crate-local context ─────────────────────────────────────────────────────

/// Error types that can wrap a plain message.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

/// Define a `Context` trait giving `Result` the `.context()` and
/// `.with_context()` adapters of the invoking crate.
///
/// The invoking module must have `Error: FromMessage` and a `Result<T>` alias
/// in scope.
///
/// ```ignore
/// // crates/registry/src/error.rs
/// microlab_common::impl_context!();
/// ```
#[macro_export]
macro_rules! impl_context {
    () => {
        pub trait Context<T> {
            fn context(self, context: impl Into<String>) -> Result<T>;
            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                let prefix = context.into();
                self.map_err(|e| {
                    <Error as $crate::FromMessage>::from_message(format!("{prefix}: {e}"))
                })
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.map_err(|e| {
                    <Error as $crate::FromMessage>::from_message(format!("{}: {e}", f().into()))
                })
            }
        }
    };
}
