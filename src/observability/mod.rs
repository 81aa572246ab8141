//! Tracing setup with optional OpenTelemetry span export to a file.
//!
//! ```text
//! tracing spans → tracing-opentelemetry → OpenTelemetry SDK → FileSpanExporter → drivedeck-otlp.json
//!              ↘ fmt layer → stderr
//! ```
//!
//! Span export writes one OTLP JSON document per line and rotates the file at
//! 10 MB, keeping three backups. Worker messages carry a
//! [`TraceContext`](crate::worker::TraceContext) so spans on the worker thread
//! join the trace that issued the command.
//!
//! # Modules
//!
//! - `init`: Subscriber assembly
//! - `tracer`: Tracer provider with the file exporter
//! - `span_formatter`: OTLP JSON serialization
//! - `file_writer`: Size-rotated line writer

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::{init_tracing, SERVICE_NAME, TRACE_FILE_NAME};
