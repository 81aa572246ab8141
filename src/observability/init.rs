//! Tracing subscriber setup.
//!
//! The registry gets an [`EnvFilter`], a compact `fmt` layer on stderr and,
//! when span export is enabled, an OpenTelemetry layer writing OTLP JSON to
//! `<data_dir>/drivedeck-otlp.json`.

use super::tracer;
use crate::domain::error::Result;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Service and scope name recorded on exported spans.
pub const SERVICE_NAME: &str = "drivedeck";

/// File name of the span export inside the data directory.
pub const TRACE_FILE_NAME: &str = "drivedeck-otlp.json";

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise from
/// `config.trace_level`. Calling this again after a subscriber is installed
/// is a no-op.
///
/// # Parameters
///
/// * `config` - Supplies `trace_level`, `export_spans` and `data_dir`
///
/// # Layers
///
/// 1. [`EnvFilter`] for level filtering
/// 2. `fmt` layer writing compact lines to stderr
/// 3. [`OpenTelemetryLayer`] exporting spans to `<data_dir>/drivedeck-otlp.json`
///    (only when `export_spans` is set)
///
/// # Example
///
/// ```no_run
/// use drivedeck::observability::init_tracing;
/// use drivedeck::Config;
/// use std::collections::BTreeMap;
///
/// let values: BTreeMap<String, String> = drivedeck::REQUIRED_KEYS
///     .iter()
///     .map(|key| (key.to_string(), "value".to_string()))
///     .collect();
/// let config = Config::from_map(&values).unwrap();
/// init_tracing(&config).unwrap();
/// tracing::info!("ready");
/// ```
///
/// # Errors
///
/// Returns [`DriveError::Io`](crate::DriveError::Io) if span export is enabled
/// and the data directory cannot be created.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.trace_level));
    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(false).compact();

    let otel_layer = if config.export_spans {
        std::fs::create_dir_all(&config.data_dir)?;
        let resource = Resource::new(vec![KeyValue::new("service.name", SERVICE_NAME)]);
        let provider = tracer::create_tracer_provider(config.data_dir.join(TRACE_FILE_NAME), resource, SERVICE_NAME);
        Some(OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME)))
    } else {
        None
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(level = %config.trace_level, export_spans = config.export_spans, "tracing initialized");
    }
    Ok(())
}
