//! Error types for todo operations.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading, mutating or persisting tasks.
#[derive(Error, Debug)]
pub enum TodoError {
    /// Name failed the 2..=32 character rule.
    #[error("Name must be between 2 and 32 characters (got {len})")]
    InvalidName { len: usize },
    /// Deadline text could not be understood.
    #[error("Could not parse deadline '{0}'. Use YYYY-MM-DD[ HH:MM], 'today', 'tomorrow', 'in 3d' or a weekday")]
    InvalidDeadline(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("No task found matching '{0}'")]
    TaskNotFound(String),
    #[error("'{identifier}' matches several tasks:\n{candidates}\nPlease use a longer id prefix instead.")]
    AmbiguousTask {
        identifier: String,
        candidates: String,
    },
    /// File system errors while reading or writing the snapshot.
    #[error("File system error at path '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Snapshot is not valid task JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TodoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TodoError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;
