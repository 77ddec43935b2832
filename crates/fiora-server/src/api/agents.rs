//! Rented-agent listing.
//!
//! GET /agents - CUA agents currently held by in-flight runs

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use fiora_core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/agents", get(list_agents))
}

async fn list_agents(State(state): State<AppState>) -> Json<serde_json::Value> {
    let agents = state.agents.list().await;
    Json(serde_json::json!({ "agents": agents }))
}
