//! Domain layer for drivedeck.
//!
//! Core types that stay independent of the document store and the runtime:
//!
//! - [`error`]: Error types and result aliases
//! - [`file`]: The cached file record and its display helpers
//! - [`payload`]: Data-URL encoding of uploaded file contents
//!
//! # Examples
//!
//! ```
//! use drivedeck::domain::payload;
//!
//! let url = payload::encode_data_url("text/plain", b"hi");
//! assert_eq!(url, "data:text/plain;base64,aGk=");
//! ```

pub mod error;
pub mod file;
pub mod payload;

pub use error::{DriveError, Result};
pub use file::{FileKind, FileRecord};
