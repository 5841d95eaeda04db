//! Sorting subsystem.
//!
//! # Data Flow
//! ```text
//! Vec<T> (owned, from the dataset generator)
//!     → parallel.rs (fork while a task is longer than the threshold)
//!         → rayon::join on disjoint split_at_mut halves
//!         → merge.rs (sequential merge sort at the leaves)
//!     ← merge.rs (two-pointer merge after each join)
//!     → SortOutcome { sorted, stats }
//! ```
//!
//! # Design Decisions
//! - One merge routine for both leaves and joins, so result never depends on fan-out
//! - Sibling tasks only ever see disjoint `&mut` slices; no locking on the data
//! - Fork statistics are returned by value and combined at each join

pub mod merge;
pub mod parallel;

pub use merge::{merge, merge_sort, sort_sequential};
pub use parallel::{ForkPolicy, ForkStats, SortEngine, SortOutcome, DEFAULT_THRESHOLD};
