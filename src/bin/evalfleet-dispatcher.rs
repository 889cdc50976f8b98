//! # Evalfleet Dispatcher Server
//!
//! Hosts the submission endpoint: every accepted submission is fanned out to one
//! worker task per batch.
//!
//! ## Usage
//!
//! ```bash
//! EVALFLEET_WEB__API_KEY=secret cargo run --bin evalfleet-dispatcher -- config/evalfleet.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

use evalfleet_core::config::ConfigManager;
use evalfleet_core::logging::init_structured_logging;
use evalfleet_core::orchestration::{HttpTaskLauncher, LocalObjectStore, TaskDispatcher};
use evalfleet_core::web::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_structured_logging();

    info!("Starting Evalfleet Dispatcher...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let manager = ConfigManager::load(config_path.as_deref())?;
    let config = manager.config();
    config.validate()?;
    info!(config = %manager.debug_config(), "Configuration loaded");

    if config.web.api_key.is_none() {
        warn!("No API key configured; submissions are accepted unauthenticated");
    }

    let store = Arc::new(LocalObjectStore::from_config(&config.dispatcher));
    let launcher = Arc::new(HttpTaskLauncher::new(
        config.dispatcher.launch_url.clone(),
        Duration::from_millis(config.client.timeout_ms),
    )?);
    let dispatcher = TaskDispatcher::new(store, launcher, config.dispatcher.clone());
    let app = create_app(AppState::new(dispatcher, config.web.clone()));

    let listener = tokio::net::TcpListener::bind(&config.web.bind_address).await?;
    info!(address = %listener.local_addr()?, "Submission endpoint listening");
    info!("   Press Ctrl+C to shutdown gracefully");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server stopped with error: {}", e);
        return Err(e.into());
    }

    info!("Dispatcher shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
