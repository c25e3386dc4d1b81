//! Startup helpers for the flight assistant server.

use std::process::ExitCode;
use std::sync::Arc;

use crate::core::config::AssistantConfig;
use crate::core::errors::AssistantResult;
use crate::server::{self, AppState};

/// Run the server until Ctrl+C, then drain queued replies.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting flight assistant v{}", env!("CARGO_PKG_VERSION"));

    let (config, state) = match initialize() {
        Ok(ready) => ready,
        Err(e) => {
            tracing::error!("Failed to initialize: {e}");
            return ExitCode::from(1);
        }
    };

    let addr = match config.server.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Invalid listen address: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let store = state.store.clone();
    let served = rt.block_on(async move {
        let result = server::run_server_with_shutdown(state, addr, shutdown_signal()).await;
        store.shutdown().await;
        result
    });

    if let Err(e) = served {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Flight assistant stopped");
    ExitCode::SUCCESS
}

/// Load and validate configuration, then build application state.
///
/// # Errors
/// Returns an error if configuration is invalid.
pub fn initialize() -> AssistantResult<(AssistantConfig, Arc<AppState>)> {
    let config = AssistantConfig::from_env()?;
    config.validate()?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        reply_latency_ms = config.replies.latency_ms,
        "Configuration loaded"
    );
    let state = AppState::new(&config)?;
    Ok((config, state))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!("Failed to listen for Ctrl+C: {e}"),
    }
}
