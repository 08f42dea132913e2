use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use omrgate_core::{
    load_config, validate_config, CommandEngine, HttpFetcher, JobOrchestrator, RecognitionEngine,
    WorkspaceManager,
};
use omrgate_server::{api::create_router, state::AppState, telemetry};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("OMRGATE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    telemetry::init(&config.logging)?;

    info!(version = VERSION, path = ?config_path, "Configuration loaded");
    info!("Workspace root: {:?}", config.workspace.root);
    info!("Cleanup policy: {:?}", config.workspace.cleanup);

    let fetcher =
        HttpFetcher::new(config.fetcher.clone()).context("Failed to create HTTP fetcher")?;

    let engine = CommandEngine::new(config.engine.clone());
    match engine.validate().await {
        Ok(()) => info!("Recognition engine: {}", config.engine.program),
        // Jobs will fail with a clear message; the service can still report
        // liveness.
        Err(e) => warn!(error = %e, "Recognition engine is not available"),
    }

    let workspaces = WorkspaceManager::new(config.workspace.clone());
    workspaces
        .check_ready()
        .await
        .context("Workspace root is not usable")?;

    let orchestrator = Arc::new(JobOrchestrator::new(
        config.jobs.clone(),
        workspaces,
        Arc::new(fetcher),
        Arc::new(engine),
    ));

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, orchestrator));

    // Create router
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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
