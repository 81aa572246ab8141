//! Infrastructure layer for filesystem and environment interactions.

pub mod mime;
pub mod paths;

pub use mime::guess_mime_type;
pub use paths::{expand_tilde, file_name_of, get_data_dir};
