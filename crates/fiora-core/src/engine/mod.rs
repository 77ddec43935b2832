//! Workflow Execution Engine — owns one run from agent rental to cleanup.
//!
//! The engine:
//! 1. Rents a CUA browser agent
//! 2. Navigates to the target SAP Fiori URL and waits a fixed grace period
//! 3. Executes each step in declared order via the interpreter
//! 4. Updates the execution registry and broadcasts after every step
//! 5. Destroys the rented agent on every exit path, best-effort
//!
//! Errors inside a run never escape: they become a terminal `failed`
//! record plus a final broadcast.

pub mod interpreter;

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::cua::{BrowserAction, CuaClient};
use crate::error::AutomatorError;
use crate::events::{ProgressBroadcaster, WorkflowEvent};
use crate::models::{AutomationRequest, ExecutionStatus, RemoteAgentHandle};
use crate::store::{AgentRegistry, ExecutionStore};

pub struct WorkflowEngine {
    client: CuaClient,
    executions: ExecutionStore,
    agents: AgentRegistry,
    broadcaster: ProgressBroadcaster,
    default_fiori_url: String,
    page_load_grace: Duration,
}

impl WorkflowEngine {
    pub fn new(
        config: &AppConfig,
        executions: ExecutionStore,
        agents: AgentRegistry,
        broadcaster: ProgressBroadcaster,
    ) -> Self {
        Self {
            client: CuaClient::new(&config.cua),
            executions,
            agents,
            broadcaster,
            default_fiori_url: config.sap_fiori_url.clone(),
            page_load_grace: config.page_load_grace,
        }
    }

    pub fn client(&self) -> &CuaClient {
        &self.client
    }

    /// Drive one run to a terminal state. The record for `run_id` must
    /// already exist in the registry with status `queued`.
    pub async fn run(&self, run_id: &str, request: AutomationRequest) {
        let cancel = match self.executions.cancel_token(run_id).await {
            Ok(token) => token,
            Err(_) => {
                tracing::error!(run_id, "run started without a registry record");
                return;
            }
        };

        // Rent the agent. Failure here aborts before any step runs and
        // leaves nothing to destroy.
        let agent_id = match self.client.create_agent().await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(run_id, "agent creation failed: {}", e);
                let _ = self
                    .executions
                    .update(run_id, |rec| {
                        rec.status = ExecutionStatus::Failed;
                        rec.error = Some(e.to_string());
                        rec.completed_at = Some(Utc::now());
                    })
                    .await;
                self.broadcast(run_id).await;
                return;
            }
        };

        self.agents
            .rent(RemoteAgentHandle::rented(agent_id.clone(), run_id))
            .await;
        let _ = self
            .executions
            .update(run_id, |rec| {
                rec.results
                    .insert("agent_id".to_string(), serde_json::json!(agent_id));
            })
            .await;

        match self.drive(run_id, &agent_id, &request, &cancel).await {
            Ok(()) => {
                // No-op when the registry already flipped the run to
                // `cancelled`: terminal records are immutable.
                let _ = self
                    .executions
                    .update(run_id, |rec| {
                        rec.status = ExecutionStatus::Completed;
                        rec.completed_at = Some(Utc::now());
                    })
                    .await;
            }
            Err(e) => {
                tracing::warn!(run_id, "workflow failed: {}", e);
                let _ = self
                    .executions
                    .update(run_id, |rec| {
                        rec.status = ExecutionStatus::Failed;
                        rec.error = Some(e.to_string());
                        rec.completed_at = Some(Utc::now());
                    })
                    .await;
            }
        }

        // Cleanup never raises and runs on every path that rented an agent.
        if let Err(e) = self.client.destroy_agent(&agent_id).await {
            tracing::warn!(run_id, agent_id = %agent_id, "agent destroy failed: {}", e);
        }
        self.agents.release(&agent_id).await;

        self.broadcast(run_id).await;
    }

    /// Navigate and iterate the step list. Returns early (Ok) when the
    /// run's cancellation token fires between steps.
    async fn drive(
        &self,
        run_id: &str,
        agent_id: &str,
        request: &AutomationRequest,
        cancel: &CancellationToken,
    ) -> Result<(), AutomatorError> {
        let url = request
            .sap_fiori_url
            .clone()
            .unwrap_or_else(|| self.default_fiori_url.clone());

        self.client
            .execute_action(agent_id, &BrowserAction::Navigate { url })
            .await?;
        // No readiness signal from the agent; give the launchpad a fixed
        // grace period to render.
        tokio::time::sleep(self.page_load_grace).await;

        for (index, step) in request.workflow_steps.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(run_id, "cancel requested, stopping before next step");
                break;
            }

            let position = (index + 1) as u32;
            self.executions
                .update(run_id, |rec| {
                    rec.current_step = Some(position);
                    rec.status = ExecutionStatus::Running;
                })
                .await?;

            let result = interpreter::execute_step(
                &self.client,
                agent_id,
                step,
                &request.template_inputs,
            )
            .await?;

            self.executions
                .update(run_id, |rec| {
                    rec.results.insert(format!("step_{}", position), result);
                })
                .await?;
            self.broadcast(run_id).await;
        }

        Ok(())
    }

    async fn broadcast(&self, run_id: &str) {
        if let Ok(record) = self.executions.get(run_id).await {
            self.broadcaster
                .publish(&WorkflowEvent::from_record(&record))
                .await;
        }
    }
}
