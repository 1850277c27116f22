mod models;
mod handlers;
mod routes;
mod docs;
mod config;
mod services;
mod websocket;
mod ws;

use config::Config;
use routes::create_app;
use services::persistence::PersistenceWriter;
use services::sync_service::{spawn_presence_ticker, SyncService};
use std::panic;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Shared state handed to every handler
pub struct AppState {
    pub config: Config,
    pub sync: Arc<SyncService>,
}

#[tokio::main]
async fn main() -> ExitCode {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Load configuration before tracing so LOG_LEVEL can drive the default filter
    let loaded = Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialize tracing
    let default_filter = format!(
        "collab_text={lvl},tower_http=debug,axum::rejection=trace,{lvl}",
        lvl = config.log_level
    );
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .init();

    info!("Starting Collaborative Text Editor server...");
    match &loaded {
        Ok(_) => info!("✅ Configuration loaded successfully"),
        Err(e) => {
            error!("❌ Failed to load configuration: {}", e);
            warn!("Using default configuration");
        }
    }
    info!("Environment: {}, text file: {}", config.environment, config.text_file.display());

    // Load the shared document from its backing file
    let sync = match SyncService::load(PersistenceWriter::new(config.text_file.clone())).await {
        Ok(sync) => Arc::new(sync),
        Err(e) => {
            error!("Failed to load the shared document: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(period) = config.presence_interval() {
        spawn_presence_ticker(sync.clone(), period);
    } else {
        warn!("Periodic presence updates disabled");
    }

    let address = config.server_address();
    let app_state = Arc::new(AppState { config: config.clone(), sync });
    let app_routes = create_app(app_state);

    // Start the HTTP/API server
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", address, e);
            return ExitCode::FAILURE;
        }
    };

    info!("🚀 Server running on http://{}", address);
    info!("📡 WebSocket available at {}", config.websocket_url());
    info!("📚 API docs available at {}", config.api_docs_url());

    if let Err(e) = axum::serve(listener, app_routes)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
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
    info!("Shutdown signal received");
}
