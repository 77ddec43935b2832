//! CUA client — drives a rented cloud browser agent over HTTP.
//!
//! Wire contract of the remote service:
//!   `POST   {base}/agents`                → `{"agent_id": "..."}`
//!   `POST   {base}/agents/{id}/actions`   → arbitrary result payload
//!   `GET    {base}/agents/{id}/screenshot`→ image payload
//!   `DELETE {base}/agents/{id}`
//!
//! All calls carry the bearer credential. Non-2xx is a hard failure for
//! create/action/screenshot; destroy failures are the caller's to swallow.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::CuaConfig;
use crate::error::AutomatorError;

/// Lifecycle calls (create/screenshot/destroy) share the client timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// UI actions can be slow (SAP Fiori rendering, iframe loads), so action
/// execution gets a longer per-request timeout.
const ACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// A structured action sent to the remote agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrowserAction {
    Navigate {
        url: String,
    },
    Click {
        selector: String,
    },
    Type {
        selector: String,
        text: String,
    },
    Select {
        selector: String,
        value: String,
    },
    WaitForElement {
        selector: String,
        condition: String,
    },
    Automation {
        automation_id: String,
        inputs: HashMap<String, String>,
    },
}

#[derive(Debug, Deserialize)]
struct CreateAgentResponse {
    agent_id: String,
}

/// HTTP client for the CUA cloud service.
#[derive(Clone)]
pub struct CuaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CuaClient {
    pub fn new(config: &CuaConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Rent a new browser agent with the default viewport and timeout.
    pub async fn create_agent(&self) -> Result<String, AutomatorError> {
        let url = format!("{}/agents", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "browser": "chrome",
                "viewport": { "width": 1920, "height": 1080 },
                "timeout": 30000
            }))
            .send()
            .await
            .map_err(|e| AutomatorError::AgentCreation(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AutomatorError::AgentCreation(e.to_string()))?;

        if !status.is_success() {
            return Err(AutomatorError::AgentCreation(body));
        }

        let parsed: CreateAgentResponse = serde_json::from_str(&body)
            .map_err(|e| AutomatorError::AgentCreation(format!("invalid response: {}", e)))?;

        tracing::info!(agent_id = %parsed.agent_id, "created CUA agent");
        Ok(parsed.agent_id)
    }

    /// Execute one structured action on the named agent.
    pub async fn execute_action(
        &self,
        agent_id: &str,
        action: &BrowserAction,
    ) -> Result<serde_json::Value, AutomatorError> {
        let url = format!("{}/agents/{}/actions", self.base_url, agent_id);
        let response = self
            .client
            .post(&url)
            .timeout(ACTION_TIMEOUT)
            .bearer_auth(&self.api_key)
            .json(action)
            .send()
            .await
            .map_err(|e| AutomatorError::ActionExecution(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AutomatorError::ActionExecution(e.to_string()))?;

        if !status.is_success() {
            return Err(AutomatorError::ActionExecution(body));
        }

        serde_json::from_str(&body)
            .map_err(|e| AutomatorError::ActionExecution(format!("invalid response: {}", e)))
    }

    /// Fetch the agent's current screen capture.
    pub async fn screenshot(&self, agent_id: &str) -> Result<serde_json::Value, AutomatorError> {
        let url = format!("{}/agents/{}/screenshot", self.base_url, agent_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AutomatorError::Screenshot(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AutomatorError::Screenshot(format!(
                "CUA service returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AutomatorError::Screenshot(e.to_string()))
    }

    /// Release the agent. Failures are reported to the caller, which is
    /// expected to log and move on — by the time destroy runs the run's
    /// outcome is already decided.
    pub async fn destroy_agent(&self, agent_id: &str) -> Result<(), AutomatorError> {
        let url = format!("{}/agents/{}", self.base_url, agent_id);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AutomatorError::Internal(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AutomatorError::Internal(format!(
                "destroy returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
