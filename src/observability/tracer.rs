//! Span export to an OpenTelemetry collector.
//!
//! # Responsibilities
//! - Resolve the collector endpoint (config, then `OTEL_EXPORTER_OTLP_ENDPOINT`)
//! - Probe the collector before committing to an exporter
//! - Build a batching OTLP/gRPC tracer provider
//!
//! # Design Decisions
//! - An unreachable collector is not fatal; the caller runs without span export
//! - The probe is a plain TCP connect bounded by `connect_timeout_secs`
//! - The provider is returned to the caller, not installed globally

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{Sampler, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};
use tokio::net::TcpStream;
use url::Url;

use crate::config::TracingConfig;

#[derive(Debug, thiserror::Error)]
pub enum TracerError {
    #[error("invalid collector endpoint {endpoint:?}: {source}")]
    Endpoint {
        endpoint: String,
        source: url::ParseError,
    },
    #[error("collector endpoint {0:?} has no host")]
    MissingHost(String),
    #[error("collector at {endpoint} unreachable: {reason}")]
    Unreachable { endpoint: String, reason: String },
    #[error("failed to build span exporter: {0}")]
    Exporter(#[from] opentelemetry::trace::TraceError),
}

/// Collector address in a form the gRPC exporter accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorEndpoint {
    pub host: String,
    pub port: u16,
    url: String,
}

impl CollectorEndpoint {
    /// Accepts full URLs as well as bare `host:port`.
    pub fn parse(raw: &str) -> Result<Self, TracerError> {
        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("http://{raw}")
        };

        let url = Url::parse(&with_scheme).map_err(|source| TracerError::Endpoint {
            endpoint: raw.to_string(),
            source,
        })?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TracerError::MissingHost(raw.to_string()))?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(4317);

        Ok(Self {
            url: format!("{}://{}:{}", url.scheme(), host, port),
            host,
            port,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

/// Fail unless a TCP connection to the collector opens within `timeout`.
pub async fn probe_collector(endpoint: &CollectorEndpoint, timeout: Duration) -> Result<(), TracerError> {
    let unreachable = |reason: String| TracerError::Unreachable {
        endpoint: endpoint.as_str().to_string(),
        reason,
    };

    match tokio::time::timeout(timeout, TcpStream::connect((endpoint.host.as_str(), endpoint.port))).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(e)) => Err(unreachable(e.to_string())),
        Err(_) => Err(unreachable(format!("no connection after {timeout:?}"))),
    }
}

/// Probe the collector and build a batching tracer provider for it.
pub async fn init_tracer(config: &TracingConfig) -> Result<TracerProvider, TracerError> {
    let endpoint = CollectorEndpoint::parse(&config.endpoint)?;
    probe_collector(&endpoint, Duration::from_secs(config.connect_timeout_secs)).await?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint.as_str())
        .with_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()?;

    let resource = Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", config.service_version.clone()),
    ]);

    Ok(TracerProvider::builder()
        .with_sampler(Sampler::AlwaysOn)
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(resource)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_port_gets_scheme() {
        let endpoint = CollectorEndpoint::parse("otel-collector:4317").unwrap();
        assert_eq!(endpoint.host, "otel-collector");
        assert_eq!(endpoint.port, 4317);
        assert_eq!(endpoint.as_str(), "http://otel-collector:4317");
    }

    #[test]
    fn test_full_url_is_kept() {
        let endpoint = CollectorEndpoint::parse("https://collector.internal:4318/").unwrap();
        assert_eq!(endpoint.as_str(), "https://collector.internal:4318");
    }

    #[test]
    fn test_default_port_from_scheme() {
        let endpoint = CollectorEndpoint::parse("http://collector").unwrap();
        assert_eq!(endpoint.port, 80);
    }

    #[test]
    fn test_garbage_endpoint_rejected() {
        assert!(CollectorEndpoint::parse("http://").is_err());
        assert!(CollectorEndpoint::parse("http://exa mple:1").is_err());
    }

    #[tokio::test]
    async fn test_probe_succeeds_against_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let endpoint = CollectorEndpoint::parse(&addr.to_string()).unwrap();

        probe_collector(&endpoint, Duration::from_secs(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_fails_when_nothing_listens() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = CollectorEndpoint::parse(&addr.to_string()).unwrap();
        let err = probe_collector(&endpoint, Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(err, TracerError::Unreachable { .. }));
    }

    #[tokio::test]
    async fn test_init_tracer_degrades_on_unreachable_collector() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = TracingConfig {
            endpoint: addr.to_string(),
            connect_timeout_secs: 1,
            ..TracingConfig::default()
        };
        assert!(init_tracer(&config).await.is_err());
    }
}
