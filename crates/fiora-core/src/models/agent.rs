//! Rented remote agent handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Running,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
        }
    }
}

/// One rented CUA browser agent. Exclusively owned by the run that rented
/// it; tracked in the agent registry until released.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteAgentHandle {
    pub agent_id: String,
    pub status: AgentStatus,
    pub current_task: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RemoteAgentHandle {
    /// A handle bound to the run that rented the agent.
    pub fn rented(agent_id: String, run_id: &str) -> Self {
        Self {
            agent_id,
            status: AgentStatus::Running,
            current_task: Some(run_id.to_string()),
            created_at: Utc::now(),
        }
    }
}
