use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every way a conversion run can fail. All of them abort the run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("line {line}: incomplete #fix record, expected at least 5 fields but found {found}")]
    IncompleteRecord { line: usize, found: usize },

    #[error("line {line}: malformed coordinate '{token}'")]
    MalformedCoordinate { line: usize, token: String },

    #[error("line {line}: elevation '{token}' is not a number")]
    MalformedElevation { line: usize, token: String },

    #[error("projection error: {0}")]
    Projection(String),

    #[error("line {line}: cannot project waypoint '{name}': {message}")]
    RecordProjection {
        line: usize,
        name: String,
        message: String,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serializer invariant: rendering targets an in-memory buffer, so this only
    /// appears if quick-xml itself misbehaves.
    #[error("failed to serialize GPX document: {0}")]
    Xml(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
