//! Worker thread message types for cross-thread communication.
//!
//! This module defines the request and response protocol between the session
//! loop and the background worker thread that owns the document store. It also
//! implements distributed tracing context propagation across the thread
//! boundary.
//!
//! Upload messages carry the batch id and queue index they belong to, so the
//! session can discard responses for a batch the user already closed.
//!
//! # Example
//!
//! ```rust
//! use drivedeck::worker::WorkerMessage;
//!
//! let message = WorkerMessage::delete_document("doc-1".to_string());
//! // Without an OpenTelemetry layer there is no context to propagate.
//! assert!(message.trace_context().is_none());
//! ```

use crate::store::DocumentFields;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Distributed tracing context for cross-thread span propagation.
///
/// Captures the current trace and span IDs from OpenTelemetry to maintain
/// trace continuity when passing messages to the worker thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking spans across threads.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Creates a trace context from the current tracing span.
    ///
    /// # Returns
    ///
    /// - `Some(TraceContext)` with hex-encoded trace and span ids when the
    ///   current span is recorded by an OpenTelemetry layer
    /// - `None` if the span context is invalid, which is the case when no
    ///   OpenTelemetry layer is installed
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let span = tracing::Span::current();

        let otel_context = span.context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if span_context.is_valid() {
            let trace_id = format!("{:032x}", span_context.trace_id());
            let parent_span_id = format!("{:016x}", span_context.span_id());

            tracing::trace!(
                trace_id = %trace_id,
                parent_span_id = %parent_span_id,
                "capturing trace context"
            );

            Some(Self { trace_id, parent_span_id })
        } else {
            None
        }
    }
}

/// Generates constructors that attach the current trace context to each
/// `WorkerMessage` variant.
///
/// Each entry `builder(Variant { field: Type, .. })` expands to
/// `pub fn builder(field: Type, ..) -> WorkerMessage` that fills every listed
/// field and sets `trace_context` from [`TraceContext::from_current`].
macro_rules! worker_message_builders {
    (
        $(
            $builder_name:ident($variant:ident { $($field:ident: $ty:ty),* $(,)? })
        ),* $(,)?
    ) => {
        impl WorkerMessage {
            $(
                #[doc = concat!("Create a ", stringify!($variant), " message with current trace context")]
                #[must_use]
                pub fn $builder_name($($field: $ty),*) -> Self {
                    Self::$variant {
                        $($field,)*
                        trace_context: TraceContext::from_current(),
                    }
                }
            )*
        }
    };
}

worker_message_builders! {
    encode_file(EncodeFile { batch: u64, index: usize, path: PathBuf }),
    create_document(CreateDocument { batch: u64, index: usize, fields: DocumentFields }),
    delete_document(DeleteDocument { id: String }),
}

/// Messages sent from the session loop to the worker thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerMessage {
    /// Read a queued file and build its document fields.
    EncodeFile {
        /// Upload batch the file belongs to.
        batch: u64,
        /// Position of the file in the upload queue.
        index: usize,
        /// File to read.
        path: PathBuf,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Write an encoded file as a new document.
    CreateDocument {
        batch: u64,
        index: usize,
        /// Fields produced by the encode step.
        fields: DocumentFields,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Permanently delete a document.
    DeleteDocument {
        /// Store-assigned document id.
        id: String,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },
}

impl WorkerMessage {
    /// Trace context attached when the message was built.
    ///
    /// The worker uses it to parent its handling span under the span that
    /// issued the command.
    #[must_use]
    pub const fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::EncodeFile { trace_context, .. }
            | Self::CreateDocument { trace_context, .. }
            | Self::DeleteDocument { trace_context, .. } => trace_context.as_ref(),
        }
    }
}

/// Responses sent from the worker thread back to the session loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerResponse {
    /// A queued file was read and encoded.
    FileEncoded {
        batch: u64,
        index: usize,
        fields: DocumentFields,
    },

    /// An encoded file was written; `id` is the store-assigned id.
    DocumentCreated { batch: u64, index: usize, id: String },

    /// A document was deleted.
    DocumentDeleted { id: String },

    /// Encoding or writing a file of the batch failed.
    UploadFailed {
        batch: u64,
        index: usize,
        message: String,
    },

    /// Deleting a document failed.
    DeleteFailed { id: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_leave_context_empty_without_otel_layer() {
        let message = WorkerMessage::delete_document("abc".to_string());
        assert_eq!(
            message,
            WorkerMessage::DeleteDocument {
                id: "abc".to_string(),
                trace_context: None,
            }
        );
        assert!(message.trace_context().is_none());
    }

    #[test]
    fn omits_missing_trace_context_on_the_wire() {
        let message = WorkerMessage::encode_file(3, 1, PathBuf::from("/tmp/a.txt"));
        let json = serde_json::to_string(&message).unwrap();
        assert!(!json.contains("trace_context"));

        let back: WorkerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }
}
