//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (sizes, thresholds, buckets, timeouts > 0)
//! - Check addresses and the collector endpoint parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ConfigIssue>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use crate::config::schema::ServiceConfig;
use crate::observability::tracer::CollectorEndpoint;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigIssue {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),
    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,
    #[error("dataset.size must be greater than zero")]
    DatasetSize,
    #[error("dataset.bound must be greater than zero")]
    DatasetBound,
    #[error("sort.threshold must be greater than zero")]
    SortThreshold,
    #[error("sort.workers must be greater than zero")]
    SortWorkers,
    #[error("observability.metrics needs a positive bucket width and count")]
    HistogramBuckets,
    #[error("observability.metrics.upkeep_interval_secs must be greater than zero")]
    MetricsUpkeep,
    #[error("observability.log_level {0:?} is not a valid filter")]
    LogLevel(String),
    #[error("observability.tracing.endpoint {0:?} is not a valid collector address")]
    TracingEndpoint(String),
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        issues.push(ConfigIssue::BindAddress(config.listener.bind_address.clone()));
    }
    if config.timeouts.request_secs == 0 {
        issues.push(ConfigIssue::RequestTimeout);
    }
    if config.dataset.size == 0 {
        issues.push(ConfigIssue::DatasetSize);
    }
    if config.dataset.bound == 0 {
        issues.push(ConfigIssue::DatasetBound);
    }
    if config.sort.threshold == 0 {
        issues.push(ConfigIssue::SortThreshold);
    }
    if config.sort.workers == Some(0) {
        issues.push(ConfigIssue::SortWorkers);
    }

    let metrics = &config.observability.metrics;
    let width_ok = metrics.bucket_width_secs.is_finite() && metrics.bucket_width_secs > 0.0;
    if metrics.bucket_count == 0 || !width_ok || !metrics.bucket_start_secs.is_finite() {
        issues.push(ConfigIssue::HistogramBuckets);
    }
    if metrics.upkeep_interval_secs == 0 {
        issues.push(ConfigIssue::MetricsUpkeep);
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        issues.push(ConfigIssue::LogLevel(config.observability.log_level.clone()));
    }

    let tracing = &config.observability.tracing;
    if tracing.enabled && CollectorEndpoint::parse(&tracing.endpoint).is_err() {
        issues.push(ConfigIssue::TracingEndpoint(tracing.endpoint.clone()));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn test_zero_upkeep_interval_rejected() {
        let mut config = ServiceConfig::default();
        config.observability.metrics.upkeep_interval_secs = 0;
        assert_eq!(validate_config(&config), Err(vec![ConfigIssue::MetricsUpkeep]));
    }

    #[test]
    fn test_collects_every_issue() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.dataset.size = 0;
        config.sort.workers = Some(0);
        config.observability.metrics.bucket_width_secs = 0.0;
        config.observability.tracing.endpoint = "http://".into();

        let issues = validate_config(&config).unwrap_err();
        assert_eq!(
            issues,
            vec![
                ConfigIssue::BindAddress("not-an-address".into()),
                ConfigIssue::RequestTimeout,
                ConfigIssue::DatasetSize,
                ConfigIssue::SortWorkers,
                ConfigIssue::HistogramBuckets,
                ConfigIssue::TracingEndpoint("http://".into()),
            ]
        );
    }

    #[test]
    fn test_disabled_tracing_skips_endpoint_check() {
        let mut config = ServiceConfig::default();
        config.observability.tracing.enabled = false;
        config.observability.tracing.endpoint = "http://".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_bad_log_filter() {
        let mut config = ServiceConfig::default();
        config.observability.log_level = "podperf=loud".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ConfigIssue::LogLevel("podperf=loud".into())])
        );
    }
}
