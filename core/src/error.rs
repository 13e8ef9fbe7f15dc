//! Error kinds shared across the dictionary store, checker, detector and ingesters.
//!
//! Each variant carries a stable numeric `code()` so that an external
//! transport layer (out of scope here) can map it to a status code without
//! re-deriving the mapping.

use thiserror::Error;

/// The error kinds named in the error handling design: every fallible
/// operation in this crate returns one of these, never a bare string.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("database is already open: {0}")]
    AlreadyOpen(String),

    #[error("read-only database: {0}")]
    ReadOnly(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable numeric code for this error kind, for transports that need one.
    pub fn code(&self) -> i32 {
        match self {
            CoreError::InvalidArgument(_) => 1,
            CoreError::NotFound(_) => 2,
            CoreError::AlreadyExists(_) => 3,
            CoreError::Encoding(_) => 4,
            CoreError::Deserialization(_) => 5,
            CoreError::Storage(_) => 6,
            CoreError::AlreadyOpen(_) => 7,
            CoreError::ReadOnly(_) => 8,
            CoreError::Io(_) => 9,
            CoreError::Internal(_) => 10,
        }
    }
}

impl From<redb::Error> for CoreError {
    fn from(e: redb::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<redb::DatabaseError> for CoreError {
    fn from(e: redb::DatabaseError) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<redb::TransactionError> for CoreError {
    fn from(e: redb::TransactionError) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<redb::TableError> for CoreError {
    fn from(e: redb::TableError) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<redb::StorageError> for CoreError {
    fn from(e: redb::StorageError) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<redb::CommitError> for CoreError {
    fn from(e: redb::CommitError) -> Self {
        CoreError::Storage(e.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoreError>;
