//! Request lifecycle state machine.
//!
//! ```text
//! Received → Validated → Generated → Sorted → Completed
//!     └───→ Rejected
//! ```
//!
//! Every transition emits exactly one instrumentation event. A rejected
//! request never generates a dataset and never opens the sort span.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::field::Empty;

use crate::observability::{Emitter, EventKind, InstrumentationEvent};
use crate::pipeline::dataset::{DatasetGenerator, NumericDataset};
use crate::pipeline::request::Request;
use crate::pipeline::response::SortResponse;
use crate::pipeline::validation::{validate, Admission, ValidationError};
use crate::sort::{ForkStats, SortEngine};

/// Values shown in log previews.
const PREVIEW_LEN: usize = 10;

/// Size and value range of the dataset generated per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetShape {
    pub size: usize,
    pub bound: NonZeroU32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Received,
    Validated,
    Generated,
    Sorted,
    Completed,
    Rejected(ValidationError),
}

/// What [`RequestLifecycle::handle`] produced for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleOutcome {
    pub state: LifecycleState,
    pub response: SortResponse,
    /// Fan-out of the sort, present once the request reached `Sorted`.
    pub stats: Option<ForkStats>,
}

impl LifecycleOutcome {
    /// HTTP status for this outcome.
    pub fn status_code(&self) -> u16 {
        match self.state {
            LifecycleState::Rejected(err) => err.status_code(),
            _ => 200,
        }
    }
}

/// Drives validator, generator and sort engine for each request.
#[derive(Debug)]
pub struct RequestLifecycle {
    emitter: Arc<Emitter>,
    engine: SortEngine,
    shape: DatasetShape,
    seed: Option<u64>,
}

impl RequestLifecycle {
    pub fn new(emitter: Arc<Emitter>, engine: SortEngine, shape: DatasetShape) -> Self {
        Self {
            emitter,
            engine,
            shape,
            seed: None,
        }
    }

    /// Generate every dataset from the same seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn emitter(&self) -> &Arc<Emitter> {
        &self.emitter
    }

    /// Run one request to a terminal state. Blocks for the duration of the sort.
    pub fn handle(&self, request: &Request) -> LifecycleOutcome {
        let started = Instant::now();
        let id = request.id();
        let root = tracing::info_span!(
            "sort-handler",
            request.id = id,
            http.status_code = Empty,
            array.size = Empty,
            error = Empty
        );
        let _root = root.enter();

        let mut state = LifecycleState::Received;
        self.emit(id, EventKind::RequestReceived {
            method: request.method().to_string(),
        });

        if let Admission::Rejected(err) = validate(request) {
            root.record("http.status_code", u64::from(err.status_code()));
            root.record("error", err.to_string().as_str());
            self.transition(id, &mut state, LifecycleState::Rejected(err), EventKind::ValidationRejected {
                reason: err,
            });
            return LifecycleOutcome {
                state,
                response: SortResponse::error(id),
                stats: None,
            };
        }
        self.transition(id, &mut state, LifecycleState::Validated, EventKind::ValidationAccepted);

        root.record("array.size", self.shape.size as u64);
        let dataset = self.generate(id);
        self.transition(id, &mut state, LifecycleState::Generated, EventKind::GenerationDone {
            size: dataset.len(),
            head: dataset.head(PREVIEW_LEN).to_vec(),
        });

        let (sorted, stats, duration) = self.sort(id, dataset);
        self.transition(id, &mut state, LifecycleState::Sorted, EventKind::SortDone {
            duration,
            stats,
            head: sorted.head(PREVIEW_LEN).to_vec(),
        });

        root.record("http.status_code", 200u64);
        self.transition(id, &mut state, LifecycleState::Completed, EventKind::RequestCompleted {
            status_code: 200,
            total: started.elapsed(),
        });

        LifecycleOutcome {
            state,
            response: SortResponse::success(id, duration),
            stats: Some(stats),
        }
    }

    /// Move to `next`, emitting the event that marks the transition.
    fn transition(&self, id: u64, state: &mut LifecycleState, next: LifecycleState, kind: EventKind) {
        tracing::trace!(requestID = %id, from = ?*state, to = ?next, "Lifecycle transition");
        *state = next;
        self.emit(id, kind);
    }

    fn generate(&self, id: u64) -> NumericDataset {
        let span = tracing::info_span!("generate-random-numbers", request.id = id, duration_seconds = Empty);
        let _span = span.enter();

        let started = Instant::now();
        let mut generator = match self.seed {
            Some(seed) => DatasetGenerator::seeded(seed),
            None => DatasetGenerator::from_entropy(),
        };
        let dataset = generator.generate(self.shape.size, self.shape.bound);
        span.record("duration_seconds", started.elapsed().as_secs_f64());
        dataset
    }

    fn sort(&self, id: u64, dataset: NumericDataset) -> (NumericDataset, ForkStats, Duration) {
        let span = tracing::info_span!(
            "parallel-merge-sort",
            request.id = id,
            duration_seconds = Empty,
            forks = Empty
        );
        let _span = span.enter();

        let started = Instant::now();
        let outcome = self.engine.sort(dataset.into_values());
        let duration = started.elapsed();

        span.record("duration_seconds", duration.as_secs_f64());
        span.record("forks", outcome.stats.forks as u64);
        (NumericDataset::from(outcome.sorted), outcome.stats, duration)
    }

    fn emit(&self, id: u64, kind: EventKind) {
        self.emitter.emit(InstrumentationEvent::new(id, kind));
    }
}
