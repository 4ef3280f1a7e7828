//! Error types for the settings registry

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the settings registry
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Declaration Errors (abort startup)
    // -------------------------------------------------------------------------
    #[error("Invalid arguments for setting '{id}': {reason}")]
    InvalidArguments { id: String, reason: String },

    #[error("Invalid arguments for group '{id}': {reason}")]
    InvalidGroupArguments { id: String, reason: String },

    #[error("Enterprise setting {0} is missing the invalidValue option")]
    MissingInvalidValue(String),

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("Type mismatch for {key}: expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Document '{0}' already exists")]
    DuplicateDocument(String),

    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse document: {0}")]
    Parse(String),

    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this error comes from a malformed declaration.
    ///
    /// These must stop process startup rather than leave the registry half-populated.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidArguments { .. }
                | Error::InvalidGroupArguments { .. }
                | Error::MissingInvalidValue(_)
        )
    }

    /// Check if this error was raised by a persistent model or its backing files
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Error::DuplicateDocument(_)
                | Error::Parse(_)
                | Error::FileRead { .. }
                | Error::FileWrite { .. }
                | Error::DirectoryCreate { .. }
        )
    }
}
