//! Rollcall daemon entrypoint.
//!
//! Serves the shared status map over HTTP. State lives in one JSON file
//! that is rewritten atomically on every mutation; there is no merge logic,
//! the last write to arrive wins.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rollcall_core::{FileStatusStore, StorageConfig};

mod api;
mod error;

use api::AppState;

const DEFAULT_PORT: u16 = 3000;
const PORT_ENV: &str = "PORT";
const DATA_FILE_ENV: &str = "ROLLCALL_DATA_FILE";
const DEBUG_LOG_ENV: &str = "ROLLCALL_DEBUG_LOG";

#[tokio::main]
async fn main() {
    init_logging();

    let data_path = match data_file_path() {
        Ok(path) => path,
        Err(err) => {
            error!(error = %err, "Failed to resolve status data path");
            std::process::exit(1);
        }
    };

    let store = FileStatusStore::new(&data_path);
    if let Err(err) = store.init() {
        error!(error = %err, path = %data_path.display(), "Failed to initialize status file");
        std::process::exit(1);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port()));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, %addr, "Failed to bind daemon port");
            std::process::exit(1);
        }
    };

    info!(%addr, data = %data_path.display(), "Rollcall daemon started");

    let app = api::create_router(AppState::new(Arc::new(store)));
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %err, "Daemon server failed");
        std::process::exit(1);
    }

    info!("Rollcall daemon shutting down");
}

fn init_logging() {
    let debug_enabled = env::var(DEBUG_LOG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn port() -> u16 {
    match env::var(PORT_ENV) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(value = %value, "Invalid PORT, using default");
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    }
}

fn data_file_path() -> Result<PathBuf, String> {
    if let Ok(path) = env::var(DATA_FILE_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    StorageConfig::resolve()
        .map(|storage| storage.data_file())
        .map_err(|err| err.to_string())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
