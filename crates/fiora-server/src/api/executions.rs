//! Workflow execution API.
//!
//! POST   /execute               - Submit a workflow, returns {run_id, status}
//! GET    /status/{run_id}       - Full execution record (404 if unknown)
//! GET    /executions            - All execution records
//! DELETE /executions/{run_id}   - Soft-cancel a running execution
//! POST   /test-connection       - CUA create/destroy round trip

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use fiora_core::models::{AutomationRequest, ExecutionRecord};
use fiora_core::{AppState, AutomatorError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/execute", post(execute))
        .route("/status/{run_id}", get(status))
        .route("/executions", get(list_executions))
        .route("/executions/{run_id}", delete(cancel))
        .route("/test-connection", post(test_connection))
}

/// POST /execute — register the run and spawn its engine task. The caller
/// gets the run id immediately; progress arrives over /ws and /status.
async fn execute(
    State(state): State<AppState>,
    Json(request): Json<AutomationRequest>,
) -> Result<Json<serde_json::Value>, AutomatorError> {
    if state.config.cua.api_key.is_empty() {
        return Err(AutomatorError::Config(
            "CUA_API_KEY not configured".to_string(),
        ));
    }

    let run_id = uuid::Uuid::new_v4().to_string();
    state
        .executions
        .create(&run_id, request.workflow_steps.len() as u32)
        .await;

    tracing::info!(run_id = %run_id, steps = request.workflow_steps.len(), "workflow queued");

    let task_state = state.clone();
    let task_run_id = run_id.clone();
    tokio::spawn(async move {
        task_state.engine.run(&task_run_id, request).await;
    });

    Ok(Json(serde_json::json!({
        "run_id": run_id,
        "status": "queued",
    })))
}

async fn status(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<ExecutionRecord>, AutomatorError> {
    state.executions.get(&run_id).await.map(Json)
}

async fn list_executions(State(state): State<AppState>) -> Json<Vec<ExecutionRecord>> {
    Json(state.executions.list().await)
}

async fn cancel(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<serde_json::Value>, AutomatorError> {
    state.executions.cancel(&run_id).await?;
    Ok(Json(serde_json::json!({ "message": "Execution cancelled" })))
}

/// POST /test-connection — rent and immediately release an agent to
/// verify credentials and reachability. Never errors at the HTTP level.
async fn test_connection(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.engine.client().create_agent().await {
        Ok(agent_id) => {
            if let Err(e) = state.engine.client().destroy_agent(&agent_id).await {
                tracing::warn!(agent_id = %agent_id, "test agent destroy failed: {}", e);
            }
            Json(serde_json::json!({
                "status": "success",
                "message": "CUA connection successful",
            }))
        }
        Err(e) => Json(serde_json::json!({
            "status": "error",
            "message": e.to_string(),
        })),
    }
}
