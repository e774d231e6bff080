// Error types for the conversion run.
// Rewrite rules never fail; only file handling and report writing surface here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input dump does not exist.
    #[error("Input file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    /// Reading or writing one of the run's files failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The JSON run report could not be serialized.
    #[error("failed to build stats report: {0}")]
    Report(#[from] serde_json::Error),
}

impl ConvertError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

// Attach a short description to an io::Result.
pub trait IoContext<T> {
    fn context(self, what: impl FnOnce() -> String) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn context(self, what: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|e| ConvertError::io(what(), e))
    }
}
