//! hookwatch exposition server.
//!
//! Usage: `hookwatch-server [config.yaml]` (default `hookwatch.yaml`).
//! Serves `/metrics` (and `/debug/pprof/*` when `server.debug` is set) until
//! Ctrl+C or SIGTERM, then shuts down gracefully.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hookwatch_core::{Provider, Registry, Result};
use hookwatch_server::{config, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, kind = e.kind().as_str(), "hookwatch-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "hookwatch.yaml".into());
    let cfg = config::load_from_file(&path)?;

    let provider = Arc::new(Provider::new(Arc::new(Registry::new()))?);
    let mut server = Server::from_config(&cfg.server, provider)?;

    tracing::info!(config = %path, debug = cfg.server.debug, "hookwatch-server starting");
    server.start();

    shutdown_signal().await;
    server.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}
