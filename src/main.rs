//! TTL Predictor - Adaptive TTL prediction for a caching layer
//!
//! Reads `{"key": "..."}` lines on stdin and answers each with
//! `{"key": "...", "ttl": N}` on stdout. Logs go to stderr.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_predictor::api::serve_lines;
use ttl_predictor::{spawn_sweep_task, Config, PredictionService};

/// Main entry point for the TTL predictor.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the prediction service
/// 4. Start background sweep task
/// 5. Serve stdin until end of input or a shutdown signal
/// 6. Log final statistics
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_predictor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting TTL predictor");

    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;
    info!(
        "Configuration loaded: ttl=[{}, {}] default={}s, window={}s, history={}/key, max_keys={}, alpha={}, strategy={:?}",
        config.min_ttl,
        config.max_ttl,
        config.default_ttl,
        config.coalesce_window_secs,
        config.history_capacity_per_key,
        config.max_tracked_keys,
        config.ema_alpha,
        config.strategy
    );

    let service = Arc::new(PredictionService::from_config(&config));
    info!("Prediction service initialized");

    let sweep_handle = spawn_sweep_task(service.clone(), config.sweep_interval);
    info!("Background sweep task started");

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    let served = tokio::select! {
        result = serve_lines(&service, stdin, stdout) => Some(result),
        _ = shutdown_signal() => None,
    };

    sweep_handle.abort();

    if let Some(result) = served {
        let count = result.context("Line protocol I/O failed")?;
        info!("Input closed after {} responses", count);
    }

    let stats = service.stats();
    info!(
        requests = stats.requests,
        hits = stats.hits,
        computations = stats.computations,
        fallbacks = stats.fallbacks,
        hit_rate = stats.hit_rate,
        "Predictor shutdown complete"
    );

    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// A signal handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
