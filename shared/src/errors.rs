//! Shared error types for the outreach campaign

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid slot status: {input}")]
    InvalidStatus { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
