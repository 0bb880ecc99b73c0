//! Campaign error types

use shared::{SharedError, SlotRef, SlotStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutreachError {
    #[error("Configuration error: {field}: {message}")]
    ConfigurationError { field: String, message: String },

    #[error("Missing required credential: {name}")]
    MissingCredential { name: String },

    #[error("Contact store not found: {path}")]
    StoreNotFound { path: String },

    #[error("Contact store already exists: {path} (use --force to overwrite)")]
    StoreExists { path: String },

    #[error("Contact store is unreadable: {path}: {message}")]
    StoreCorrupt { path: String, message: String },

    #[error("Slot reference out of range: {slot}")]
    SlotOutOfRange { slot: SlotRef },

    #[error("Illegal status transition on {slot}: {from} -> {to}")]
    IllegalTransition {
        slot: SlotRef,
        from: SlotStatus,
        to: SlotStatus,
    },

    #[error("Message composition failed: {message}")]
    CompositionError { message: String },

    #[error("Spreadsheet import failed: {message}")]
    SpreadsheetError { message: String },

    #[error("File system operation failed: {operation} on {path}")]
    FileSystemError {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl OutreachError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        OutreachError::ConfigurationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn fs(operation: &str, path: &std::path::Path, source: std::io::Error) -> Self {
        OutreachError::FileSystemError {
            operation: operation.to_string(),
            path: path.display().to_string(),
            source,
        }
    }
}

pub type OutreachResult<T> = Result<T, OutreachError>;
