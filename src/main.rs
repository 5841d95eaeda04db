//! podperf: CPU-bound sort service for observability demos.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                   PODPERF                     │
//!                      │                                               │
//!   GET /sort          │  ┌────────┐   ┌───────────────────────────┐  │
//!   ───────────────────┼─▶│  http  │──▶│     RequestLifecycle      │  │
//!                      │  │ server │   │ validate → generate → sort│  │
//!   JSON response      │  └────────┘   └─────────────┬─────────────┘  │
//!   ◀──────────────────┼──────┘                      │                │
//!                      │                      ┌──────▼──────┐         │
//!   GET /metrics ──────┼─────────────────────▶│   Emitter   │         │
//!                      │                      │ metrics/logs│         │
//!                      │                      └──────┬──────┘         │
//!                      └─────────────────────────────┼────────────────┘
//!                                                    ▼
//!                                 stdout / log file / OTLP collector
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use podperf::config::resolve_config;
use podperf::http::HttpServer;
use podperf::lifecycle::{self, Shutdown};
use podperf::observability::init_telemetry;

#[derive(Debug, Parser)]
#[command(name = "podperf", version, about = "CPU-bound sort service for observability demos")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "PODPERF_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Nothing is logging yet, so config errors go straight to stderr via `?`.
    let config = resolve_config(cli.config.as_deref(), cli.bind)?;
    let telemetry = init_telemetry(&config.observability).await?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "podperf starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        tracing_enabled = telemetry.tracing_enabled(),
        "Configuration loaded"
    );

    let emitter = lifecycle::build_emitter(&config.observability)?;
    let request_lifecycle = Arc::new(lifecycle::build_lifecycle(&config, emitter.clone())?);

    let listener = match lifecycle::bind_listener(&config.listener.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start server");
            telemetry.shutdown().await;
            return Err(e.into());
        }
    };
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let upkeep = lifecycle::spawn_metrics_upkeep(
        emitter,
        Duration::from_secs(config.observability.metrics.upkeep_interval_secs),
        shutdown.subscribe(),
    );
    let server = HttpServer::new(&config.timeouts, request_lifecycle);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let finished = tokio::select! {
        result = &mut server_task => Some(result),
        _ = lifecycle::wait_for_shutdown_signal() => None,
    };
    let served = match finished {
        Some(result) => result,
        None => {
            shutdown.trigger();
            server_task.await
        }
    };

    match served {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server failed"),
        Err(e) => tracing::error!(error = %e, "HTTP server task panicked"),
    }

    shutdown.trigger();
    if let Err(e) = upkeep.await {
        tracing::error!(error = %e, "Metrics upkeep task panicked");
    }

    telemetry.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
