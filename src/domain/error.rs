//! Error types for drivedeck.
//!
//! This module defines the centralized error type [`DriveError`] and a type alias
//! [`Result`] used throughout the crate. All errors are implemented with the
//! `thiserror` crate.

use thiserror::Error;

/// The main error type for drivedeck operations.
///
/// Errors raised by store commands are caught at the operation boundary
/// (upload, delete) and turned into an inline message in the drive state; they
/// never reach a global handler.
///
/// # Examples
///
/// ```
/// use drivedeck::DriveError;
///
/// fn validate_config() -> Result<(), DriveError> {
///     Err(DriveError::Config("missing api_key".to_string()))
/// }
///
/// assert!(validate_config().is_err());
/// ```
#[derive(Debug, Error)]
pub enum DriveError {
    /// A document store command was rejected or could not be persisted.
    #[error("Store error: {0}")]
    Store(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A payload could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Communication with the background worker failed.
    #[error("Worker communication error: {0}")]
    Worker(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The document change stream failed or disconnected.
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// A referenced file is not present in the cache or the bin.
    #[error("File not found: {0}")]
    NotFound(String),
}

/// A specialized `Result` type for drivedeck operations.
pub type Result<T> = std::result::Result<T, DriveError>;
