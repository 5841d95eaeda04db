//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! RequestLifecycle
//!     → emitter.rs (one call per lifecycle transition)
//!         → metrics.rs (counters, gauge, histogram)
//!         → tracing macros → logging.rs (JSON lines: stdout, optional file)
//!         → events.rs (extra sinks)
//!     → tracing spans → tracer.rs (OTLP export, optional)
//!
//! Consumers:
//!     → Prometheus scrape of GET /metrics
//!     → Log shipper tailing stdout / the log file
//!     → OpenTelemetry collector
//! ```
//!
//! # Design Decisions
//! - Everything is constructed once in `main` and passed down explicitly
//! - Instrumentation only happens at the root of a request, never inside sort tasks
//! - Losing the collector degrades tracing; logs and metrics keep working

pub mod emitter;
pub mod events;
pub mod logging;
pub mod metrics;
pub mod tracer;

use std::sync::Arc;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::TracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;

pub use emitter::Emitter;
pub use events::{EventKind, EventSink, InstrumentationEvent, MemorySink};
pub use metrics::SortMetrics;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to install subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Keeps the span exporter alive; call [`TelemetryGuard::shutdown`] on exit.
#[derive(Debug)]
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl TelemetryGuard {
    pub fn tracing_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Flush pending spans and close the collector connection.
    pub async fn shutdown(self) {
        let Some(provider) = self.provider else {
            return;
        };

        match tokio::task::spawn_blocking(move || provider.shutdown()).await {
            Ok(Ok(())) => tracing::info!("Tracer provider shut down"),
            Ok(Err(e)) => tracing::error!(error = %e, "Failed to shutdown tracer provider"),
            Err(e) => tracing::error!(error = %e, "Tracer shutdown task failed"),
        }
    }
}

/// Install the global subscriber: JSON logs to stdout and the optional file,
/// plus span export when the collector is reachable.
pub async fn init_telemetry(config: &ObservabilityConfig) -> Result<TelemetryGuard, TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };

    let (log_file, log_file_error) = match config.log_file.as_deref() {
        Some(path) => match logging::open_log_file(path) {
            Ok(file) => (Some(Arc::new(file)), None),
            Err(e) => (None, Some(e)),
        },
        None => (None, None),
    };

    let (provider, tracer_error) = if config.tracing.enabled {
        match tracer::init_tracer(&config.tracing).await {
            Ok(provider) => (Some(provider), None),
            Err(e) => (None, Some(e)),
        }
    } else {
        (None, None)
    };

    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.tracing.service_name.clone()))
    });
    let file_layer = log_file.map(|file| fmt::layer().event_format(logging::JsonLines).with_writer(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().event_format(logging::JsonLines).with_writer(std::io::stdout))
        .with(file_layer)
        .with(otel_layer)
        .try_init()?;

    if let (Some(path), Some(e)) = (config.log_file.as_deref(), log_file_error) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to open log file, logging to stdout only");
    }
    match (&provider, tracer_error) {
        (Some(_), _) => tracing::info!(endpoint = %config.tracing.endpoint, "Using OTLP endpoint"),
        (None, Some(e)) => {
            tracing::warn!(error = %e, "Failed to initialize tracer, continuing without tracing")
        }
        (None, None) => tracing::info!("Span export disabled"),
    }

    Ok(TelemetryGuard { provider })
}
