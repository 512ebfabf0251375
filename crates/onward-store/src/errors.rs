//! Error helpers for onward-store
//!
//! Convert backend errors into the core `StoreError`, keeping the original
//! error as its source.

use onward_core::errors::{ErrorKind, StoreError};

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> StoreError {
    let kind = match err {
        rusqlite::Error::QueryReturnedNoRows => ErrorKind::NotFound,
        rusqlite::Error::InvalidParameterCount(..)
        | rusqlite::Error::InvalidColumnIndex(_)
        | rusqlite::Error::MultipleStatement => ErrorKind::InvalidInput,
        _ => ErrorKind::Persistence,
    };
    StoreError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
        .with_source(err)
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> StoreError {
    StoreError::new(ErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
        .with_source(err)
}
