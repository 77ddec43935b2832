pub mod agents;
pub mod executions;
pub mod ws;

use axum::Router;

use fiora_core::AppState;

/// Build the complete API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(executions::router())
        .merge(agents::router())
        .merge(ws::router())
}
