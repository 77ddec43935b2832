//! Fiora Server — SAP Fiori Automation Backend
//!
//! A standalone Rust backend that orchestrates browser-automation
//! workflows against an SAP Fiori launchpad by driving rented CUA
//! (computer-use agent) cloud browsers:
//! - RESTful HTTP API via axum
//! - live progress over a WebSocket channel
//! - in-memory execution and agent registries (fiora-core)
//!
//! This crate can be used standalone or embedded in other hosts.

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use fiora_core::{AppConfig, AppState, AppStateInner};

/// Configuration for the Fiora backend server.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Create a shared `AppState` from the process environment.
pub fn create_app_state() -> AppState {
    Arc::new(AppStateInner::new(AppConfig::from_env()))
}

/// Build the full application router (API routes + banner/health), ready
/// to serve. Exposed so tests and embedders can drive the same app.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::api_router())
        .route("/", get(root))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the backend server.
///
/// Returns the actual address the server is listening on.
pub async fn start_server(config: ServerConfig) -> Result<SocketAddr, String> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fiora_server=info,tower_http=info".into()),
        )
        .init();

    tracing::info!(
        "Starting Fiora backend server on {}:{}",
        config.host,
        config.port
    );

    let state = create_app_state();
    if state.config.cua.api_key.is_empty() {
        tracing::warn!("CUA_API_KEY is not set; workflow submission will be rejected");
    }

    start_server_with_state(config, state).await
}

/// Start the HTTP server with a pre-built `AppState`.
pub async fn start_server_with_state(
    config: ServerConfig,
    state: AppState,
) -> Result<SocketAddr, String> {
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local address: {}", e))?;

    tracing::info!("Fiora backend server listening on {}", local_addr);

    // Spawn the server in a background task
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(local_addr)
}

async fn root() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "message": "SAP Fiori Automator Backend",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
    }))
}
