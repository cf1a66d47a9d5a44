use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no such snapshot '{name}'")]
    NotFound { name: String },

    #[error("snapshot '{name}' is unreadable: {source}")]
    CorruptData {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{tool}: {message}")]
    Capture { tool: String, message: String },

    #[error("invalid snapshot name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Storage { path: path.into(), source }
    }

    pub(crate) fn capture(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Capture { tool: tool.into(), message: message.into() }
    }

    /// true when the error means the named snapshot is simply absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
