use alloc::string::String;

use thiserror::Error;

/// Failure of a [`Database`](crate::Database) operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DatabaseError {
    #[error("def name \"{0}\" doesn't match pattern [A-Za-z_][A-Za-z0-9_]*")]
    InvalidName(String),

    #[error("def \"{0}\" already exists in this scope")]
    Duplicate(String),

    #[error("def is not registered in the database")]
    NotRegistered,
}
