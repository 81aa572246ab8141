//! Tracer provider backed by a file span exporter.
//!
//! Spans are exported synchronously (simple processor) as OTLP JSON lines, so
//! nothing is lost when the process exits without flushing.

use super::file_writer::FileWriter;
use super::span_formatter::SpanFormatter;
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::future::ready;
use std::path::PathBuf;

/// File-based OpenTelemetry span exporter.
///
/// Implements [`SpanExporter`] by writing each exported batch as one line of a
/// rotating trace file. Every line is a complete OTLP JSON document carrying
/// the resource attributes and the instrumentation scope.
#[derive(Debug)]
struct FileSpanExporter {
    /// File writer with size-based rotation.
    writer: FileWriter,
    /// OTLP JSON formatter.
    formatter: SpanFormatter,
    /// Set by `shutdown`; later exports are refused.
    is_shutdown: bool,
}

impl SpanExporter for FileSpanExporter {
    /// Exports a batch of spans to the trace file.
    ///
    /// # Parameters
    ///
    /// * `batch` - Finished spans handed over by the span processor
    ///
    /// # Returns
    ///
    /// A ready future resolving to:
    /// - `Ok(())` if the batch line was written
    /// - `Err(TraceError)` if the exporter is shut down or the write failed
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.is_shutdown {
            return Box::pin(ready(Err(TraceError::from("exporter is shut down"))));
        }

        let line = self.formatter.format_batch(&batch).to_string();
        let result = self
            .writer
            .write_line(&line)
            .map_err(|e| TraceError::from(format!("failed to write spans: {e}")));
        Box::pin(ready(result))
    }

    /// Marks the exporter as shut down. Nothing is buffered, so there is
    /// nothing to flush.
    fn shutdown(&mut self) {
        self.is_shutdown = true;
    }
}

/// Creates a tracer provider that exports spans to a file.
///
/// The provider uses a simple (synchronous) span processor: each span is
/// written as soon as it ends. There is no background export thread to stop.
///
/// # Parameters
///
/// * `file_path` - Trace file; rotated backups are written next to it
/// * `resource` - Resource attributes such as `service.name`
/// * `scope` - Instrumentation scope name recorded in every batch
///
/// # Returns
///
/// A [`TracerProvider`] whose tracers feed the file exporter.
pub fn create_tracer_provider(file_path: PathBuf, resource: Resource, scope: &'static str) -> TracerProvider {
    let exporter = FileSpanExporter {
        writer: FileWriter::new(file_path),
        formatter: SpanFormatter::new(resource.clone(), scope),
        is_shutdown: false,
    };

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
