//! Virgil Storage inspection server
//!
//! Serves one namespace of a file-backed store over HTTP for development.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use virgil_storage::api::create_router;
use virgil_storage::storage::{log_all, DynBackend, FileBackend, Storage};
use virgil_storage::{spawn_sweep_task, AppState, Config};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the file backend and wrap it in a namespaced store
/// 4. Dump the namespace (development only)
/// 5. Start the sweep task if an interval is configured
/// 6. Serve the router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "virgil_storage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Virgil storage inspector");

    let config = Config::from_env();
    info!(
        "Configuration loaded: prefix={}, path={}, quota={:?}, port={}, sweep_interval={}s, environment={:?}",
        config.prefix,
        config.data_path.display(),
        config.quota_bytes,
        config.server_port,
        config.sweep_interval,
        config.environment
    );

    let backend = FileBackend::open(&config.data_path, config.quota_bytes)
        .with_context(|| format!("failed to open {}", config.data_path.display()))?;
    let backend: DynBackend = Box::new(backend);
    let storage = Storage::with_prefix(backend, config.prefix.clone());

    log_all(&storage, config.environment);

    let state = AppState::new(storage);

    let sweep_handle = if config.sweep_interval > 0 {
        info!("Sweep task started");
        Some(spawn_sweep_task(state.storage.clone(), config.sweep_interval))
    } else {
        info!("Sweep disabled, expired entries are removed when read");
        None
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep task.
async fn shutdown_signal(sweep_handle: Option<tokio::task::JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Sweep task aborted");
    }
}
