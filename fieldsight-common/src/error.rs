//! Common error types for FieldSight

use thiserror::Error;

/// Common result type for FieldSight operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the FieldSight crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Submitted instance is not well-formed XML
    #[error("Malformed XML: {0}")]
    MalformedXml(#[from] roxmltree::Error),

    /// Submitted instance is well-formed but breaks a document rule
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
