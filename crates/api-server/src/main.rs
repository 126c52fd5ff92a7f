//! Emotion graph API server
//!
//! Serves text → emotion graph analysis over HTTP.
//!
//! ## Environment Variables
//!
//! - `PORT`: Server port (default: 3000)
//! - `EMOTION_MODE`: `online`, `offline` or `auto` (default: auto)
//! - `EMOTION_CLUSTERS`: `primaries` or `valence` (default: primaries)
//! - `EMOTION_API_KEY`: Remote model credential; enables the remote path in auto mode
//! - `EMOTION_API_BASE_URL`, `EMOTION_MODEL`, `EMOTION_API_TIMEOUT_SECS`: Remote model settings

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use affect_service::{Route, ServiceConfig};
use api_server::{create_router_with_middleware, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api_server=info,affect_service=info,model_client=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let config = ServiceConfig::from_env();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("Starting emotion graph API server on {}", addr);
    tracing::info!("Analysis mode: {:?}, clusters: {:?}", config.mode, config.clusters);
    match config.route() {
        Route::Remote => tracing::info!("Remote model enabled: {}", config.model.model),
        Route::Local => {
            tracing::info!("Running local heuristic only");
            tracing::info!("Set EMOTION_API_KEY to enable the remote model in auto mode");
        }
    }

    let state = Arc::new(AppState::new(config));
    let app = create_router_with_middleware(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
