//! Error types for dynsec-core

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for dynsec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, loading or saving the relation store.
///
/// Unknown document keys are deliberately absent: they are logged and skipped,
/// never surfaced as errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No room left for another entity of this kind.
    #[error("Out of memory: cannot create another {kind} (limit {limit})")]
    OutOfMemory {
        /// Entity kind ("group", "role", "client")
        kind: &'static str,
        /// Configured capacity for that kind
        limit: usize,
    },

    /// A record could not be committed.
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// What was wrong with the record
        message: String,
        /// Underlying cause, if any
        #[source]
        source: Option<Box<Error>>,
    },

    /// The underlying document or event stream is malformed.
    #[error("Stream error: {message}")]
    Stream {
        /// Description of the syntax problem
        message: String,
    },

    /// The event writer refused an event.
    #[error("Emit error: {message}")]
    Emit {
        /// Description of the failure
        message: String,
    },

    /// The bidirectional link invariant does not hold.
    #[error("Inconsistent store: {message}")]
    Inconsistent {
        /// First violation found
        message: String,
    },

    /// A named entity does not exist.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Entity kind
        kind: &'static str,
        /// Name that was looked up
        name: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error, optionally tied to a path
    #[error("I/O error{}: {source}", .path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    Io {
        /// Path being accessed, if known
        path: Option<PathBuf>,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Creates an invalid-record error.
    pub fn invalid_record<S: Into<String>>(message: S) -> Self {
        Error::InvalidRecord {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an invalid-record error wrapping a cause.
    pub fn invalid_record_with_source<S: Into<String>>(message: S, source: Error) -> Self {
        Error::InvalidRecord {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a stream error.
    pub fn stream<S: Into<String>>(message: S) -> Self {
        Error::Stream {
            message: message.into(),
        }
    }

    /// Creates an emit error.
    pub fn emit<S: Into<String>>(message: S) -> Self {
        Error::Emit {
            message: message.into(),
        }
    }

    /// Creates an inconsistency error.
    pub fn inconsistent<S: Into<String>>(message: S) -> Self {
        Error::Inconsistent {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found<S: Into<String>>(kind: &'static str, name: S) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error together with the path that caused it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: Some(path.as_ref().to_path_buf()),
            source,
        }
    }

    /// Whether the error only invalidates the current record.
    ///
    /// Stream and emit errors abort the whole load or save call.
    pub fn is_record_local(&self) -> bool {
        matches!(self, Error::InvalidRecord { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { path: None, source }
    }
}
