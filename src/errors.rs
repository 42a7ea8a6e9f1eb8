//! Error types for the kbboard application.
//!
//! This module defines the error kinds surfaced by board operations. None of
//! them is fatal: every error is recovered at the operation boundary and
//! reported to the user.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the kbboard application.
#[derive(Error, Debug)]
pub enum BoardError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors raised while writing tabular exports.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Undo/redo with nothing to do.
    #[error("{message}")]
    NoOp { message: String },

    /// Import payload is malformed.
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    /// A required field is empty or a value is out of range.
    #[error("Validation failed: {message}")]
    ValidationFailure { message: String },

    /// Note was not found when performing an operation.
    #[error("Note not found: {id}")]
    NoteNotFound { id: String },

    /// Nothing has been persisted at the given location yet.
    #[error("Nothing stored at: {path}")]
    NotFound { path: PathBuf },

    /// Storage is unavailable or full.
    #[error("Failed to persist notes: {message}")]
    PersistenceFailure { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// The reminder scheduler could not be started, stopped or reached.
    #[error("Reminder scheduler error: {message}")]
    SchedulerError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },
}

impl BoardError {
    pub fn validation(message: impl Into<String>) -> Self {
        BoardError::ValidationFailure {
            message: message.into(),
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        BoardError::InvalidFormat {
            message: message.into(),
        }
    }

    /// Whether this error only reports that there was nothing to do
    pub fn is_noop(&self) -> bool {
        matches!(self, BoardError::NoOp { .. })
    }
}
