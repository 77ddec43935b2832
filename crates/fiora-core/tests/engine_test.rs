//! Integration tests: drive the workflow engine end-to-end against a
//! mock CUA service bound to a random local port.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tokio::sync::Mutex;

use fiora_core::config::{AppConfig, CuaConfig};
use fiora_core::models::{AutomationRequest, ExecutionStatus, WorkflowStep};
use fiora_core::state::{AppState, AppStateInner};

// ── Mock CUA service ──────────────────────────────────────────────────

#[derive(Default)]
struct MockCua {
    actions: Vec<serde_json::Value>,
    created: usize,
    destroyed: usize,
    fail_create: bool,
}

type MockHandle = Arc<Mutex<MockCua>>;

async fn create_agent(State(mock): State<MockHandle>) -> axum::response::Response {
    let mut m = mock.lock().await;
    if m.fail_create {
        return (StatusCode::INTERNAL_SERVER_ERROR, "no agent capacity").into_response();
    }
    m.created += 1;
    Json(serde_json::json!({ "agent_id": format!("agent-{}", m.created) })).into_response()
}

async fn record_action(
    State(mock): State<MockHandle>,
    Path(_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    mock.lock().await.actions.push(body);
    Json(serde_json::json!({ "ok": true }))
}

async fn screenshot(
    State(_mock): State<MockHandle>,
    Path(_id): Path<String>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "image": "iVBORw0KGgo=" }))
}

async fn destroy_agent(
    State(mock): State<MockHandle>,
    Path(_id): Path<String>,
) -> Json<serde_json::Value> {
    mock.lock().await.destroyed += 1;
    Json(serde_json::json!({}))
}

async fn spawn_mock_cua(fail_create: bool) -> (String, MockHandle) {
    let mock: MockHandle = Arc::new(Mutex::new(MockCua {
        fail_create,
        ..Default::default()
    }));

    let app = Router::new()
        .route("/agents", post(create_agent))
        .route("/agents/{id}/actions", post(record_action))
        .route("/agents/{id}/screenshot", get(screenshot))
        .route("/agents/{id}", delete(destroy_agent))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), mock)
}

// ── Helpers ───────────────────────────────────────────────────────────

fn test_state(cua_base_url: &str) -> AppState {
    let config = AppConfig {
        cua: CuaConfig {
            base_url: cua_base_url.to_string(),
            api_key: "test-key".to_string(),
        },
        sap_fiori_url: "http://fiori.local:8080".to_string(),
        // Keep the post-navigation grace short for tests.
        page_load_grace: Duration::from_millis(20),
    };
    Arc::new(AppStateInner::new(config))
}

fn step(id: &str, step_type: &str, order: u32, config: serde_json::Value) -> WorkflowStep {
    WorkflowStep {
        id: id.to_string(),
        step_type: step_type.to_string(),
        step_order: order,
        config,
    }
}

fn request(steps: Vec<WorkflowStep>, template_inputs: &[(&str, &str)]) -> AutomationRequest {
    AutomationRequest {
        workflow_steps: steps,
        template_inputs: template_inputs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        sap_fiori_url: None,
    }
}

async fn wait_for_terminal(state: &AppState, run_id: &str) -> fiora_core::models::ExecutionRecord {
    for _ in 0..500 {
        let record = state.executions.get(run_id).await.unwrap();
        if record.status.is_terminal() {
            return record;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("run {} did not reach a terminal state", run_id);
}

// ── Tests ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_successful_run_records_all_steps() {
    let (base_url, mock) = spawn_mock_cua(false).await;
    let state = test_state(&base_url);

    let steps = vec![
        step("s1", "action", 1, serde_json::json!({"selector": "#tile"})),
        step("s2", "screenshot", 2, serde_json::Value::Null),
    ];
    state.executions.create("run-1", 2).await;
    state.engine.run("run-1", request(steps, &[])).await;

    let record = wait_for_terminal(&state, "run-1").await;
    assert_eq!(record.status, ExecutionStatus::Completed);
    assert_eq!(record.current_step, Some(2));
    assert!(record.completed_at.is_some());
    assert!(record.error.is_none());
    assert!(record.results.contains_key("agent_id"));
    assert!(record.results.contains_key("step_1"));
    assert!(record.results.contains_key("step_2"));
    assert_eq!(record.results["step_1"]["action"], "click");
    assert!(record.results["step_2"]["screenshot"]["image"].is_string());

    let m = mock.lock().await;
    assert_eq!(m.created, 1);
    assert_eq!(m.destroyed, 1);
    // navigate + click; the screenshot goes through its own endpoint.
    assert_eq!(m.actions.len(), 2);
    assert_eq!(m.actions[0]["type"], "navigate");
    assert_eq!(m.actions[0]["url"], "http://fiori.local:8080");
}

#[tokio::test]
async fn test_template_substitution_reaches_the_agent() {
    let (base_url, mock) = spawn_mock_cua(false).await;
    let state = test_state(&base_url);

    let steps = vec![step(
        "s1",
        "action",
        1,
        serde_json::json!({"action": "type", "selector": "#user", "value": "{username}"}),
    )];
    state.executions.create("run-1", 1).await;
    state
        .engine
        .run("run-1", request(steps, &[("username", "alice")]))
        .await;

    let record = wait_for_terminal(&state, "run-1").await;
    assert_eq!(record.status, ExecutionStatus::Completed);

    let m = mock.lock().await;
    let typed = m
        .actions
        .iter()
        .find(|a| a["type"] == "type")
        .expect("type action should have reached the agent");
    assert_eq!(typed["selector"], "#user");
    assert_eq!(typed["text"], "alice");
}

#[tokio::test]
async fn test_unknown_step_type_fails_the_run() {
    let (base_url, mock) = spawn_mock_cua(false).await;
    let state = test_state(&base_url);

    let steps = vec![
        step("s1", "bogus", 1, serde_json::Value::Null),
        step("s2", "screenshot", 2, serde_json::Value::Null),
    ];
    state.executions.create("run-1", 2).await;
    state.engine.run("run-1", request(steps, &[])).await;

    let record = wait_for_terminal(&state, "run-1").await;
    assert_eq!(record.status, ExecutionStatus::Failed);
    assert!(record.error.as_deref().unwrap().contains("bogus"));
    assert_eq!(record.current_step, Some(1));
    assert!(!record.results.contains_key("step_1"));
    assert!(!record.results.contains_key("step_2"));

    // The agent is still destroyed exactly once.
    let m = mock.lock().await;
    assert_eq!(m.destroyed, 1);
    // Only the navigation was sent; no step action ran.
    assert_eq!(m.actions.len(), 1);
}

#[tokio::test]
async fn test_agent_creation_failure_aborts_before_steps() {
    let (base_url, mock) = spawn_mock_cua(true).await;
    let state = test_state(&base_url);

    let steps = vec![step("s1", "screenshot", 1, serde_json::Value::Null)];
    state.executions.create("run-1", 1).await;
    state.engine.run("run-1", request(steps, &[])).await;

    let record = wait_for_terminal(&state, "run-1").await;
    assert_eq!(record.status, ExecutionStatus::Failed);
    assert!(record.current_step.is_none());
    assert!(record.error.as_deref().unwrap().contains("no agent capacity"));
    assert!(!record.results.contains_key("agent_id"));
    assert!(record.results.keys().all(|k| !k.starts_with("step_")));

    let m = mock.lock().await;
    assert_eq!(m.destroyed, 0);
    assert!(m.actions.is_empty());
}

#[tokio::test]
async fn test_concurrent_runs_do_not_cross_contaminate() {
    let (base_url, _mock) = spawn_mock_cua(false).await;
    let state = test_state(&base_url);

    let steps_a = vec![step("a1", "action", 1, serde_json::json!({"selector": "#a"}))];
    let steps_b = vec![
        step("b1", "screenshot", 1, serde_json::Value::Null),
        step("b2", "screenshot", 2, serde_json::Value::Null),
    ];

    state.executions.create("run-a", 1).await;
    state.executions.create("run-b", 2).await;

    let state_a = state.clone();
    let state_b = state.clone();
    let task_a =
        tokio::spawn(async move { state_a.engine.run("run-a", request(steps_a, &[])).await });
    let task_b =
        tokio::spawn(async move { state_b.engine.run("run-b", request(steps_b, &[])).await });
    let _ = tokio::join!(task_a, task_b);

    let a = wait_for_terminal(&state, "run-a").await;
    let b = wait_for_terminal(&state, "run-b").await;

    assert_eq!(a.status, ExecutionStatus::Completed);
    assert_eq!(b.status, ExecutionStatus::Completed);
    assert!(a.results.contains_key("step_1"));
    assert!(!a.results.contains_key("step_2"));
    assert!(b.results.contains_key("step_1"));
    assert!(b.results.contains_key("step_2"));
    assert_eq!(a.results["step_1"]["action"], "click");
    assert!(b.results["step_1"]["screenshot"].is_object());
}

#[tokio::test]
async fn test_cancel_stops_before_the_next_step() {
    let (base_url, mock) = spawn_mock_cua(false).await;
    let state = test_state(&base_url);

    // A slow local step followed by a remote one that must never run.
    let steps = vec![
        step("s1", "delay", 1, serde_json::json!({"duration": 500})),
        step("s2", "action", 2, serde_json::json!({"selector": "#never"})),
    ];
    state.executions.create("run-1", 2).await;

    let runner = state.clone();
    let task = tokio::spawn(async move {
        runner.engine.run("run-1", request(steps, &[])).await;
    });

    // Wait until the delay step is in flight, then cancel.
    for _ in 0..200 {
        let record = state.executions.get("run-1").await.unwrap();
        if record.status == ExecutionStatus::Running {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    state.executions.cancel("run-1").await.unwrap();
    task.await.unwrap();

    let record = state.executions.get("run-1").await.unwrap();
    assert_eq!(record.status, ExecutionStatus::Cancelled);
    assert!(record.completed_at.is_some());
    assert!(!record.results.contains_key("step_2"));

    let m = mock.lock().await;
    // Only the navigation reached the agent; the click never did.
    assert!(m.actions.iter().all(|a| a["type"] != "click"));
    assert_eq!(m.destroyed, 1);
}
