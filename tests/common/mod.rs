//! Shared harness for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use podperf::config::{MetricsConfig, TimeoutConfig};
use podperf::http::HttpServer;
use podperf::lifecycle::{bind_listener, Shutdown};
use podperf::observability::{Emitter, MemorySink, SortMetrics};
use podperf::pipeline::{DatasetShape, Method, Request, RequestLifecycle};
use podperf::sort::{ForkPolicy, SortEngine};

/// A lifecycle over a small dataset, with every event captured.
pub struct Harness {
    pub lifecycle: Arc<RequestLifecycle>,
    pub sink: Arc<MemorySink>,
}

impl Harness {
    pub fn new(size: usize, threshold: usize) -> Self {
        let sink = Arc::new(MemorySink::new());
        let metrics = SortMetrics::new(&MetricsConfig::default()).unwrap();
        let emitter = Arc::new(Emitter::new(metrics).with_sink(sink.clone()));
        let shape = DatasetShape {
            size,
            bound: NonZeroU32::new(20_000).unwrap(),
        };
        let engine = SortEngine::new(ForkPolicy::new(threshold));
        let lifecycle = RequestLifecycle::new(emitter, engine, shape).with_seed(42);

        Self {
            lifecycle: Arc::new(lifecycle),
            sink,
        }
    }

    pub fn metrics(&self) -> String {
        self.lifecycle.emitter().render_metrics()
    }

    pub fn server(&self) -> HttpServer {
        HttpServer::new(&TimeoutConfig::default(), self.lifecycle.clone())
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(2_000, 500)
    }
}

/// Request whose id is exactly `id`.
pub fn request_with_id(method: Method, id: u64) -> Request {
    Request::new(method, UNIX_EPOCH + Duration::from_nanos(id))
}

/// A server on an ephemeral port, stopped through `shutdown`.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn spawn_server(harness: &Harness) -> RunningServer {
    let listener = bind_listener("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(harness.server().run(listener, shutdown.subscribe()));

    RunningServer { addr, shutdown, task }
}
