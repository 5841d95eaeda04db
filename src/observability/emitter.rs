//! The process-wide instrumentation sink.
//!
//! One [`Emitter`] is built at startup and shared by `Arc`. Each event fans out
//! to the metrics recorder, one structured log line, and any extra sinks.
//! Spans are opened by the caller; log lines emitted here land inside them.

use std::fmt;
use std::sync::Arc;

use crate::observability::events::{EventKind, EventSink, InstrumentationEvent};
use crate::observability::metrics::SortMetrics;

pub struct Emitter {
    metrics: SortMetrics,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Emitter {
    pub fn new(metrics: SortMetrics) -> Self {
        Self {
            metrics,
            sinks: Vec::new(),
        }
    }

    /// Attach another event destination.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn emit(&self, event: InstrumentationEvent) {
        self.record_metrics(&event.kind);
        log_event(&event);
        for sink in &self.sinks {
            sink.record(&event);
        }
    }

    pub fn render_metrics(&self) -> String {
        self.metrics.render()
    }

    pub fn run_metrics_upkeep(&self) {
        self.metrics.run_upkeep();
    }

    fn record_metrics(&self, kind: &EventKind) {
        match kind {
            EventKind::RequestReceived { .. } => self.metrics.record_request(),
            EventKind::ValidationRejected { .. } => self.metrics.record_error(),
            EventKind::GenerationDone { size, .. } => self.metrics.set_array_size(*size),
            EventKind::SortDone { duration, .. } => {
                self.metrics.observe_sort_duration(duration.as_secs_f64())
            }
            EventKind::ValidationAccepted | EventKind::RequestCompleted { .. } => {}
        }
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("metrics", &self.metrics)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

fn log_event(event: &InstrumentationEvent) {
    let id = event.request_id;
    match &event.kind {
        EventKind::RequestReceived { method } => {
            tracing::info!(requestID = %id, method = %method, "Received sort request");
        }
        EventKind::ValidationAccepted => {
            tracing::debug!(requestID = %id, "Request accepted");
        }
        EventKind::ValidationRejected { reason } => {
            let msg = match reason {
                crate::pipeline::ValidationError::MethodNotAllowed => "Method not allowed",
                crate::pipeline::ValidationError::OddEvenGate => "Request is even",
            };
            tracing::warn!(
                requestID = %id,
                status = reason.status_code(),
                reason = reason.reason(),
                "{msg}"
            );
        }
        EventKind::GenerationDone { size, head } => {
            tracing::info!(requestID = %id, size = *size, "Unsorted (first 10): {head:?}");
        }
        EventKind::SortDone { duration, stats, head } => {
            tracing::info!(
                requestID = %id,
                duration_seconds = duration.as_secs_f64(),
                forks = stats.forks,
                fanout_levels = stats.fanout_levels,
                sorted_head = ?head,
                "Finished sorting in {duration:?}"
            );
        }
        EventKind::RequestCompleted { status_code, total } => {
            tracing::info!(
                requestID = %id,
                status = *status_code,
                total_seconds = total.as_secs_f64(),
                "Request completed"
            );
        }
    }
}
