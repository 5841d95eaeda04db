//! Fork-join merge sort.
//!
//! # Responsibilities
//! - Decide per task whether to fork or fall back to sequential sorting
//! - Run both halves concurrently and wait for both before merging
//! - Report how much fan-out actually happened
//!
//! # Design Decisions
//! - A task longer than `threshold` forks; anything else sorts sequentially
//! - `rayon::join` is the barrier; the wait has no timeout or cancellation
//! - Work runs on a fixed-size rayon pool, never one OS thread per fork

use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use serde::Serialize;

use crate::sort::merge::{merge_halves, merge_sort};

/// Default fork threshold in elements.
pub const DEFAULT_THRESHOLD: usize = 100_000;

/// When a sort task is allowed to split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkPolicy {
    threshold: usize,
    max_depth: Option<usize>,
}

impl ForkPolicy {
    /// Fork every task longer than `threshold`, with no depth cap.
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            max_depth: None,
        }
    }

    /// Never fork.
    pub fn sequential() -> Self {
        Self::new(DEFAULT_THRESHOLD).with_max_depth(0)
    }

    /// Cap the number of fan-out levels.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Whether a task of `len` elements at recursion `depth` should split.
    pub fn should_fork(&self, len: usize, depth: usize) -> bool {
        if self.max_depth.is_some_and(|max| depth >= max) {
            return false;
        }
        len > self.threshold
    }
}

impl Default for ForkPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// Fan-out that happened during one sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ForkStats {
    /// Number of fork-join points.
    pub forks: usize,
    /// Deepest chain of nested forks from the root.
    pub fanout_levels: usize,
    /// Subtrees that were sorted sequentially.
    pub sequential_leaves: usize,
}

impl ForkStats {
    fn leaf() -> Self {
        Self {
            forks: 0,
            fanout_levels: 0,
            sequential_leaves: 1,
        }
    }

    fn joined(left: Self, right: Self) -> Self {
        Self {
            forks: 1 + left.forks + right.forks,
            fanout_levels: 1 + left.fanout_levels.max(right.fanout_levels),
            sequential_leaves: left.sequential_leaves + right.sequential_leaves,
        }
    }
}

/// Result of [`SortEngine::sort`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome<T> {
    pub sorted: Vec<T>,
    pub stats: ForkStats,
}

/// Concurrent divide-and-conquer merge sort.
#[derive(Clone)]
pub struct SortEngine {
    policy: ForkPolicy,
    pool: Option<Arc<ThreadPool>>,
}

impl SortEngine {
    /// Engine that runs its forks on the global rayon pool.
    pub fn new(policy: ForkPolicy) -> Self {
        Self { policy, pool: None }
    }

    /// Engine with a dedicated pool of `workers` threads.
    pub fn with_workers(policy: ForkPolicy, workers: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("podperf-sort-{i}"))
            .build()?;

        Ok(Self {
            policy,
            pool: Some(Arc::new(pool)),
        })
    }

    pub fn policy(&self) -> ForkPolicy {
        self.policy
    }

    /// Sort `values`, returning them in non-decreasing order with fork statistics.
    pub fn sort<T: Ord + Copy + Send>(&self, mut values: Vec<T>) -> SortOutcome<T> {
        let mut scratch = values.clone();
        let policy = self.policy;
        let mut run = || sort_task(&mut values, &mut scratch, 0, &policy);

        let stats = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        SortOutcome {
            sorted: values,
            stats,
        }
    }
}

impl std::fmt::Debug for SortEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortEngine")
            .field("policy", &self.policy)
            .field("dedicated_pool", &self.pool.as_ref().map(|p| p.current_num_threads()))
            .finish()
    }
}

/// One sort task over `data`, with `scratch` as its private merge buffer.
fn sort_task<T: Ord + Copy + Send>(
    data: &mut [T],
    scratch: &mut [T],
    depth: usize,
    policy: &ForkPolicy,
) -> ForkStats {
    if !policy.should_fork(data.len(), depth) {
        merge_sort(data, scratch);
        return ForkStats::leaf();
    }

    let mid = data.len() / 2;
    let (left_stats, right_stats) = {
        let (left, right) = data.split_at_mut(mid);
        let (left_scratch, right_scratch) = scratch.split_at_mut(mid);
        rayon::join(
            || sort_task(left, left_scratch, depth + 1, policy),
            || sort_task(right, right_scratch, depth + 1, policy),
        )
    };

    merge_halves(data, scratch, mid);
    ForkStats::joined(left_stats, right_stats)
}
