use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hwpdf_core::{
    create_bridge, load_config, validate_config, ArtifactStore, BackendAdapter, CommandEngine,
    ConversionService, ExecutionLane, LaneBackend,
};
use hwpdf_server::api::create_router;
use hwpdf_server::state::AppState;

/// Name of the single backend lane.
const BACKEND_LANE: &str = "backend";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("HWPDF_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Temp directory: {:?}", config.storage.temp_dir);
    info!(
        "Backend: {} (timeout {}s)",
        config.backend.program.display(), config.backend.timeout_secs
    );

    // Prepare the shared temp directory
    let store = ArtifactStore::new(&config.storage.temp_dir);
    store.ensure_dir().await.with_context(|| {
        format!(
            "Failed to create temp directory {:?}",
            config.storage.temp_dir
        )
    })?;

    // Start the backend lane; it owns the engine for the life of the process
    let engine = CommandEngine::new(config.backend.clone());
    let lane = Arc::new(
        ExecutionLane::spawn(
            BACKEND_LANE,
            BackendAdapter::new(engine),
            config.lane.queue_capacity,
        )
        .context("Failed to start backend lane")?,
    );
    info!(
        "Backend lane started (queue capacity {})",
        config.lane.queue_capacity
    );

    // Create the format bridge; a broken installation only disables bridging
    let bridge = create_bridge(&config.bridge);
    match bridge.validate().await {
        Ok(()) => info!("Format bridge ready: {}", bridge.name()),
        Err(e) => warn!(
            "Format bridge unavailable, HWP bridging will fail: {}",
            e
        ),
    }

    let service = Arc::new(ConversionService::new(
        store,
        Arc::new(LaneBackend::new(Arc::clone(&lane))),
        bridge,
    ));

    // Create app state
    let lane_for_status = Arc::clone(&lane);
    let state = Arc::new(
        AppState::new(config.clone(), service)
            .with_lane_status(Arc::new(move || lane_for_status.status())),
    );

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Drain queued conversions and join the lane worker
    info!("Server shutting down...");
    lane.shutdown().await;
    info!("Backend lane stopped");

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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
