use std::path::PathBuf;

use microlab_common::FromMessage;

/// Fatal scaffolding errors. Anything non-fatal is a
/// [`microlab_common::Warning`] instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid project name {raw:?}: {reason}")]
    InvalidName { raw: String, reason: &'static str },
    #[error("folder already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse manifest {}: {reason}", path.display())]
    ManifestParse { path: PathBuf, reason: String },
    #[error(transparent)]
    Command(#[from] microlab_common::Error),
    #[error("{0}")]
    Message(String),
}

impl Error {
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn manifest(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ManifestParse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

microlab_common::impl_context!();
