//! Shared application state for the HTTP server and CLI.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::engine::WorkflowEngine;
use crate::events::ProgressBroadcaster;
use crate::store::{AgentRegistry, ExecutionStore};

/// Shared state accessible by all API handlers. Constructed once at
/// process start; every registry lives here, not in globals.
pub struct AppStateInner {
    pub config: AppConfig,
    pub executions: ExecutionStore,
    pub agents: AgentRegistry,
    pub broadcaster: ProgressBroadcaster,
    pub engine: WorkflowEngine,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn new(config: AppConfig) -> Self {
        let executions = ExecutionStore::new();
        let agents = AgentRegistry::new();
        let broadcaster = ProgressBroadcaster::new();
        let engine = WorkflowEngine::new(
            &config,
            executions.clone(),
            agents.clone(),
            broadcaster.clone(),
        );
        Self {
            config,
            executions,
            agents,
            broadcaster,
            engine,
        }
    }
}
