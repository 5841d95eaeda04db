//! Instrumentation events and pluggable sinks.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use crate::pipeline::ValidationError;
use crate::sort::ForkStats;

/// What happened, with the attributes that belong to it.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    RequestReceived { method: String },
    ValidationAccepted,
    ValidationRejected { reason: ValidationError },
    GenerationDone { size: usize, head: Vec<u32> },
    SortDone { duration: Duration, stats: ForkStats, head: Vec<u32> },
    RequestCompleted { status_code: u16, total: Duration },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::RequestReceived { .. } => "request_received",
            EventKind::ValidationAccepted => "validation_accepted",
            EventKind::ValidationRejected { .. } => "validation_rejected",
            EventKind::GenerationDone { .. } => "generation_done",
            EventKind::SortDone { .. } => "sort_done",
            EventKind::RequestCompleted { .. } => "request_completed",
        }
    }
}

/// One lifecycle transition of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentationEvent {
    pub request_id: u64,
    pub timestamp: SystemTime,
    pub kind: EventKind,
}

impl InstrumentationEvent {
    pub fn new(request_id: u64, kind: EventKind) -> Self {
        Self {
            request_id,
            timestamp: SystemTime::now(),
            kind,
        }
    }
}

/// Extra destination for events, alongside metrics and logs.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &InstrumentationEvent);
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<InstrumentationEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<InstrumentationEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Event names recorded for one request, in emission order.
    pub fn kinds_for(&self, request_id: u64) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.request_id == request_id)
            .map(|e| e.kind.name())
            .collect()
    }

    /// How many events named `name` were recorded.
    pub fn count(&self, name: &str) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.kind.name() == name)
            .count()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &InstrumentationEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
