//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from a TOML file, and
//! every field has a default so an empty file is a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sort::DEFAULT_THRESHOLD;

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Shape of the generated dataset.
    pub dataset: DatasetConfig,

    /// Fork-join sort tuning.
    pub sort: SortConfig,

    /// Logging, metrics and span export.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed for a whole HTTP request, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Dataset generated for every accepted request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Number of values.
    pub size: usize,

    /// Exclusive upper bound of every value.
    pub bound: u32,

    /// Fixed seed; every request then sorts the same dataset.
    pub seed: Option<u64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            size: 20_000,
            bound: 20_000,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SortConfig {
    /// Tasks of at most this many elements sort sequentially.
    pub threshold: usize,

    /// Maximum fan-out levels (unbounded when absent).
    pub max_depth: Option<usize>,

    /// Dedicated worker threads (global rayon pool when absent).
    pub workers: Option<usize>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_depth: None,
            workers: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter (trace, debug, info, warn, error or a full directive).
    pub log_level: String,

    /// Also write JSON log lines to this file.
    pub log_file: Option<PathBuf>,

    pub metrics: MetricsConfig,

    pub tracing: TracingConfig,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            metrics: MetricsConfig::default(),
            tracing: TracingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prefix for every metric name, joined with `_`.
    pub namespace: Option<String>,

    /// Upper bound of the first histogram bucket, in seconds.
    pub bucket_start_secs: f64,

    /// Width of each histogram bucket, in seconds.
    pub bucket_width_secs: f64,

    /// Number of histogram buckets.
    pub bucket_count: usize,

    /// How often pending histogram samples are folded into buckets, in seconds.
    pub upkeep_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            bucket_start_secs: 1.0,
            bucket_width_secs: 1.0,
            bucket_count: 10,
            upkeep_interval_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Export spans at all.
    pub enabled: bool,

    /// OTLP/gRPC collector endpoint; `OTEL_EXPORTER_OTLP_ENDPOINT` overrides it.
    pub endpoint: String,

    pub service_name: String,

    pub service_version: String,

    /// How long to wait for the collector at startup.
    pub connect_timeout_secs: u64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://otel-collector:4317".to_string(),
            service_name: "podperf-zipkin-service".to_string(),
            service_version: "1.0.0".to_string(),
            connect_timeout_secs: 10,
        }
    }
}
