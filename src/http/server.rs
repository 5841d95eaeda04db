//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the axum router with all handlers
//! - Wire up middleware (request timeout, tracing)
//! - Serve on a bound listener until shutdown is signalled
//!
//! # Design Decisions
//! - Handlers share state through `AppState`, built once from the startup objects
//! - The timeout bounds the HTTP response only; a sort already running on the
//!   blocking pool finishes in the background
//! - Graceful shutdown: in-flight requests complete before `run` returns

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::TimeoutConfig;
use crate::http::handlers;
use crate::observability::Emitter;
use crate::pipeline::RequestLifecycle;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<RequestLifecycle>,
    pub emitter: Arc<Emitter>,
}

/// HTTP server for the sort service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(timeouts: &TimeoutConfig, lifecycle: Arc<RequestLifecycle>) -> Self {
        let state = AppState {
            emitter: lifecycle.emitter().clone(),
            lifecycle,
        };

        Self {
            router: Self::build_router(timeouts, state),
        }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(timeouts: &TimeoutConfig, state: AppState) -> Router {
        Router::new()
            .route("/sort", any(handlers::sort))
            .route("/health", get(handlers::health))
            .route("/metrics", get(handlers::metrics))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
