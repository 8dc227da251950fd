//! DocShift Server: file-conversion gateway.
//!
//! Loads configuration, initializes logging, prepares the scratch root and
//! serves the HTTP API until Ctrl+C or SIGTERM.

use std::future::IntoFuture;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use docshift_api::{AppState, build_router};
use docshift_core::config::AppConfig;
use docshift_core::error::AppError;

/// Command-line arguments. Values given here override the loaded config.
#[derive(Debug, Parser)]
#[command(name = "docshift-server", version, about = "DocShift file-conversion gateway")]
struct Args {
    /// Environment overlay loaded from `config/<env>.toml`.
    #[arg(long, env = "DOCSHIFT_ENV", default_value = "development")]
    env: String,

    /// Listen address.
    #[arg(long)]
    host: Option<String>,

    /// Listen port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_configuration(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load layered configuration and apply CLI overrides.
fn load_configuration(args: &Args) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load(&args.env)?;

    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    Ok(config)
}

/// Initialize tracing/logging. `RUST_LOG` wins over `logging.level`.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DocShift v{}", env!("CARGO_PKG_VERSION"));

    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = AppState::new(config)?;
    tracing::info!(
        scratch_root = %state.scratch.root().display(),
        max_concurrent_jobs = state.config.converter.max_concurrent_jobs,
        "Scratch space ready"
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("DocShift server listening on {}", addr);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let grace_elapsed = async move {
        if shutdown_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server.into_future() => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = grace_elapsed => {
            tracing::warn!(
                grace_seconds = grace.as_secs(),
                "Shutdown grace period elapsed, dropping in-flight requests"
            );
        }
    }

    tracing::info!("DocShift server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
