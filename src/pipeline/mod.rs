//! Request-processing pipeline.
//!
//! # Data Flow
//! ```text
//! HTTP request (method, arrival time)
//!     → request.rs (Request with timestamp-derived id)
//!     → validation.rs (method check, parity gate)
//!         ✗ Rejected → response.rs (error envelope), no further work
//!     → dataset.rs (uniform random dataset)
//!     → sort engine (fork-join merge sort)
//!     → response.rs (success envelope with duration)
//! ```
//!
//! `orchestrator.rs` drives the whole chain and feeds the instrumentation
//! emitter at each transition.

pub mod dataset;
pub mod orchestrator;
pub mod request;
pub mod response;
pub mod validation;

pub use dataset::{DatasetGenerator, NumericDataset};
pub use orchestrator::{DatasetShape, LifecycleOutcome, LifecycleState, RequestLifecycle};
pub use request::{Method, Request};
pub use response::{ResponseStatus, SortResponse};
pub use validation::{validate, Admission, ValidationError};
