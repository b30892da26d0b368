use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber;

use floodgate::config::FloodgateConfig;
use floodgate::http::{AppState, HttpServer};
use floodgate::ratelimit::FixedWindowLimiter;
use floodgate::store::RedisCounterStore;

#[derive(Debug, Parser)]
#[command(name = "floodgate", about = "Redis-backed fixed-window rate limiting service")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("Starting Floodgate Rate Limiting Service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = FloodgateConfig::load(args.config.as_deref())?;
    info!(
        http_addr = %config.server.http_addr,
        redis_url = %config.redis.url,
        "Configuration loaded"
    );

    // Initialize the shared counter store and the rate limiter
    let client = redis::Client::open(config.redis.url.as_str())?;
    let store = Arc::new(RedisCounterStore::new(client));
    let limiter = Arc::new(FixedWindowLimiter::new(store, config.quotas.defaults()));
    info!(
        default_limit = config.quotas.default_limit,
        default_window_secs = config.quotas.default_window_secs,
        "Rate limiter initialized"
    );

    let state = AppState {
        limiter,
        api_key: config.server.api_key.clone(),
    };
    let server = HttpServer::new(config.server.http_addr, state);

    // Run the server with graceful shutdown on Ctrl+C or SIGTERM
    server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Floodgate Rate Limiting Service stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
