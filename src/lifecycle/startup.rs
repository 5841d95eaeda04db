//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the emitter and the request lifecycle from configuration
//! - Bind the listener
//! - Start the metrics upkeep task
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Validated config is assumed; the checks here only guard type conversions

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::{ObservabilityConfig, ServiceConfig};
use crate::observability::{Emitter, SortMetrics};
use crate::pipeline::{DatasetShape, RequestLifecycle};
use crate::sort::{ForkPolicy, SortEngine};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error("failed to build sort worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to build metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
    #[error("dataset bound must be positive")]
    DatasetBound,
}

/// The process-wide emitter.
pub fn build_emitter(config: &ObservabilityConfig) -> Result<Arc<Emitter>, StartupError> {
    let metrics = SortMetrics::new(&config.metrics)?;
    Ok(Arc::new(Emitter::new(metrics)))
}

/// Sort engine, dataset shape and lifecycle, all sharing `emitter`.
pub fn build_lifecycle(config: &ServiceConfig, emitter: Arc<Emitter>) -> Result<RequestLifecycle, StartupError> {
    let mut policy = ForkPolicy::new(config.sort.threshold);
    if let Some(depth) = config.sort.max_depth {
        policy = policy.with_max_depth(depth);
    }

    let engine = match config.sort.workers {
        Some(workers) => SortEngine::with_workers(policy, workers)?,
        None => SortEngine::new(policy),
    };

    let shape = DatasetShape {
        size: config.dataset.size,
        bound: NonZeroU32::new(config.dataset.bound).ok_or(StartupError::DatasetBound)?,
    };

    tracing::info!(
        threshold = policy.threshold(),
        max_depth = ?policy.max_depth(),
        workers = ?config.sort.workers,
        dataset_size = shape.size,
        dataset_bound = shape.bound.get(),
        "Sort pipeline ready"
    );

    let lifecycle = RequestLifecycle::new(emitter, engine, shape);
    Ok(match config.dataset.seed {
        Some(seed) => lifecycle.with_seed(seed),
        None => lifecycle,
    })
}

/// Fold pending histogram samples into buckets every `every`, so they do not
/// pile up between scrapes. Stops when `shutdown` fires.
pub fn spawn_metrics_upkeep(
    emitter: Arc<Emitter>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = ticker.tick() => emitter.run_metrics_upkeep(),
                _ = shutdown.recv() => break,
            }
        }
        tracing::debug!("Metrics upkeep stopped");
    })
}

/// Bind the HTTP listener.
pub async fn bind_listener(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })
}
