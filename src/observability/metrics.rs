//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sort_requests_total` (counter): every request to `/sort`
//! - `errors_total` (counter): rejected requests
//! - `array_size` (gauge): size of the last generated dataset
//! - `sort_duration_seconds` (histogram): sort phase duration, linear buckets
//!
//! # Design Decisions
//! - The recorder belongs to the emitter instead of being installed globally
//! - Handles are registered once; updates are atomic operations
//! - An optional namespace prefixes every name (e.g. `podperf_`)

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Level, Metadata, Recorder, SharedString, Unit};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

pub const REQUESTS_TOTAL: &str = "sort_requests_total";
pub const ERRORS_TOTAL: &str = "errors_total";
pub const ARRAY_SIZE: &str = "array_size";
pub const SORT_DURATION_SECONDS: &str = "sort_duration_seconds";

/// `count` buckets starting at `start`, each `width` apart.
pub fn linear_buckets(start: f64, width: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + width * i as f64).collect()
}

/// Fully qualified metric names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricNames {
    pub requests: String,
    pub errors: String,
    pub array_size: String,
    pub sort_duration: String,
}

impl MetricNames {
    pub fn new(namespace: Option<&str>) -> Self {
        let qualify = |name: &str| match namespace {
            Some(ns) if !ns.is_empty() => format!("{ns}_{name}"),
            _ => name.to_string(),
        };

        Self {
            requests: qualify(REQUESTS_TOTAL),
            errors: qualify(ERRORS_TOTAL),
            array_size: qualify(ARRAY_SIZE),
            sort_duration: qualify(SORT_DURATION_SECONDS),
        }
    }
}

/// The four service metrics, backed by a private Prometheus recorder.
pub struct SortMetrics {
    requests: Counter,
    errors: Counter,
    array_size: Gauge,
    sort_duration: Histogram,
    handle: PrometheusHandle,
}

impl SortMetrics {
    pub fn new(config: &MetricsConfig) -> Result<Self, BuildError> {
        let names = MetricNames::new(config.namespace.as_deref());
        let buckets = linear_buckets(
            config.bucket_start_secs,
            config.bucket_width_secs,
            config.bucket_count,
        );

        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(names.sort_duration.clone()), &buckets)?
            .build_recorder();
        let handle = recorder.handle();

        recorder.describe_counter(
            KeyName::from(names.requests.clone()),
            None,
            SharedString::from("The total number of sort requests"),
        );
        recorder.describe_counter(
            KeyName::from(names.errors.clone()),
            None,
            SharedString::from("Total number of errors"),
        );
        recorder.describe_gauge(
            KeyName::from(names.array_size.clone()),
            None,
            SharedString::from("The size of array being sorted"),
        );
        recorder.describe_histogram(
            KeyName::from(names.sort_duration.clone()),
            Some(Unit::Seconds),
            SharedString::from("The duration of sort operations in seconds"),
        );

        let metadata = Metadata::new(module_path!(), Level::INFO, Some(module_path!()));
        Ok(Self {
            requests: recorder.register_counter(&Key::from_name(names.requests), &metadata),
            errors: recorder.register_counter(&Key::from_name(names.errors), &metadata),
            array_size: recorder.register_gauge(&Key::from_name(names.array_size), &metadata),
            sort_duration: recorder.register_histogram(&Key::from_name(names.sort_duration), &metadata),
            handle,
        })
    }

    pub fn record_request(&self) {
        self.requests.increment(1);
    }

    pub fn record_error(&self) {
        self.errors.increment(1);
    }

    pub fn set_array_size(&self, size: usize) {
        self.array_size.set(size as f64);
    }

    pub fn observe_sort_duration(&self, seconds: f64) {
        self.sort_duration.record(seconds);
    }

    /// Drain pending histogram samples into their buckets.
    pub fn run_upkeep(&self) {
        self.handle.run_upkeep();
    }

    /// Prometheus text exposition of everything recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for SortMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortMetrics").finish_non_exhaustive()
    }
}

/// Value of an unlabelled sample line such as `errors_total 3`.
pub fn sample_value(exposition: &str, name: &str) -> Option<f64> {
    exposition.lines().find_map(|line| {
        let (metric, value) = line.split_once(' ')?;
        if metric == name {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(namespace: Option<&str>) -> SortMetrics {
        let config = MetricsConfig {
            namespace: namespace.map(str::to_string),
            ..MetricsConfig::default()
        };
        SortMetrics::new(&config).unwrap()
    }

    #[test]
    fn test_linear_buckets() {
        assert_eq!(linear_buckets(1.0, 1.0, 3), vec![1.0, 2.0, 3.0]);
        assert_eq!(linear_buckets(0.5, 0.25, 2), vec![0.5, 0.75]);
        assert!(linear_buckets(1.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_namespace_prefixes_names() {
        let names = MetricNames::new(Some("podperf"));
        assert_eq!(names.requests, "podperf_sort_requests_total");
        assert_eq!(names.sort_duration, "podperf_sort_duration_seconds");
        assert_eq!(MetricNames::new(Some("")).errors, "errors_total");
        assert_eq!(MetricNames::new(None).array_size, "array_size");
    }

    #[test]
    fn test_render_reports_counters_and_gauge() {
        let metrics = metrics(None);
        metrics.record_request();
        metrics.record_request();
        metrics.record_error();
        metrics.set_array_size(20_000);

        let text = metrics.render();
        assert_eq!(sample_value(&text, "sort_requests_total"), Some(2.0));
        assert_eq!(sample_value(&text, "errors_total"), Some(1.0));
        assert_eq!(sample_value(&text, "array_size"), Some(20_000.0));
    }

    #[test]
    fn test_histogram_uses_linear_buckets() {
        let metrics = metrics(Some("podperf"));
        metrics.observe_sort_duration(2.5);

        let text = metrics.render();
        assert_eq!(sample_value(&text, "podperf_sort_duration_seconds_count"), Some(1.0));
        assert!(text.contains("podperf_sort_duration_seconds_bucket{le="));
        assert!(text.contains("podperf_sort_duration_seconds_bucket{le=\"+Inf\"} 1"));
    }

    #[test]
    fn test_upkeep_folds_samples_before_render() {
        let metrics = metrics(None);
        metrics.observe_sort_duration(0.5);
        metrics.observe_sort_duration(4.0);
        metrics.run_upkeep();

        let text = metrics.render();
        assert_eq!(sample_value(&text, "sort_duration_seconds_count"), Some(2.0));
        assert_eq!(sample_value(&text, "sort_duration_seconds_sum"), Some(4.5));
    }

    #[test]
    fn test_separate_instances_do_not_share_state() {
        let a = metrics(None);
        let b = metrics(None);
        a.record_request();
        assert_eq!(sample_value(&b.render(), "sort_requests_total").unwrap_or(0.0), 0.0);
        assert_eq!(sample_value(&a.render(), "sort_requests_total"), Some(1.0));
    }

    #[test]
    fn test_empty_bucket_layout_rejected() {
        let config = MetricsConfig { bucket_count: 0, ..MetricsConfig::default() };
        assert!(SortMetrics::new(&config).is_err());
    }
}
