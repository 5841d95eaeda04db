//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, defaults for missing fields)
//!     → loader.rs (OTEL_EXPORTER_OTLP_ENDPOINT, --bind overrides)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::{
    DatasetConfig, ListenerConfig, MetricsConfig, ObservabilityConfig, ServiceConfig, SortConfig,
    TimeoutConfig, TracingConfig,
};
pub use validation::{validate_config, ConfigIssue};
