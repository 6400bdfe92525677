//! Error types for the meridian core library.

use std::path::PathBuf;

use thiserror::Error;

/// Error type shared by every core operation.
#[derive(Error, Debug)]
pub enum MeridianError {
    /// Run archive connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Archived run not found for the given ID
    #[error("Run with ID {id} not found")]
    RunNotFound { id: u64 },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// An external collaborator (scorer, mutator, oracle, executor) failed
    #[error("{role} failed: {message}")]
    Collaborator { role: &'static str, message: String },
    /// A retried collaborator call never produced a well-formed value
    #[error("{label} gave no well-formed response after {attempts} attempts: {last_reason}")]
    RetriesExhausted {
        label: String,
        attempts: u32,
        last_reason: String,
    },
    /// A step result was written twice
    #[error("Result for step '{goal}' has already been recorded")]
    ResultAlreadyRecorded { goal: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> MeridianError {
        MeridianError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> MeridianError {
        MeridianError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl MeridianError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a collaborator failure for the given role.
    pub fn collaborator(role: &'static str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            role,
            message: message.into(),
        }
    }

    /// Wraps a tokio join failure from an archive or batch task.
    pub(crate) fn join(error: tokio::task::JoinError) -> Self {
        Self::Configuration {
            message: format!("Task join error: {error}"),
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| MeridianError::database(message).with_source(e))
    }
}

/// Result type alias for meridian operations
pub type Result<T> = std::result::Result<T, MeridianError>;
