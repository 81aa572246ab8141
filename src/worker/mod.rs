//! Background worker thread for document store commands and file encoding.
//!
//! The worker owns the [`DocumentStore`](crate::store::DocumentStore) and runs
//! commands strictly in arrival order, so upload writes never interleave.
//!
//! # Architecture
//!
//! - `messages`: Request/response protocol types with trace context propagation
//! - `handler`: Worker implementation and message processing logic

pub mod handler;
pub mod messages;

pub use handler::{spawn_worker, DriveWorker};
pub use messages::{TraceContext, WorkerMessage, WorkerResponse};
