//! Tag Arena Server
//!
//! Hosts two-player platformer tag matches. Clients connect over `/ws`, get
//! paired by the lobby, and only ever send held keys; every match is simulated
//! at 60 Hz on its own task and streamed back as snapshots.

mod app;
mod config;
mod game;
mod http;
mod matchmaking;
mod util;
mod ws;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::AppState;
use crate::config::Config;
use crate::http::build_router;
use crate::util::time::init_server_time;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine, the process environment still applies
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);
    init_server_time();

    info!(
        addr = %config.server_addr,
        time_limit = config.match_time_limit,
        origins = ?config.client_origins,
        "Starting Tag Arena Server"
    );

    serve(config).await?;

    info!("Tag Arena Server stopped");
    Ok(())
}

/// Bind the listener and serve until a shutdown signal arrives
async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.server_addr;
    let router = build_router(AppState::new(config));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Accepting players on ws://{}/ws", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed never
/// resolves, leaving the other one in charge.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = interrupt => info!("Interrupted, draining connections"),
        _ = terminate() => info!("Terminated, draining connections"),
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            error!(error = %e, "SIGTERM handler unavailable");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await
}
