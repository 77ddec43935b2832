//! In-memory registry of currently rented CUA agents.
//!
//! Feeds the `GET /agents` listing. An entry exists only while its run
//! holds the agent; release removes it whether or not the remote destroy
//! succeeded.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::RemoteAgentHandle;

#[derive(Clone)]
pub struct AgentRegistry {
    agents: Arc<RwLock<HashMap<String, RemoteAgentHandle>>>,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn rent(&self, handle: RemoteAgentHandle) {
        let mut agents = self.agents.write().await;
        agents.insert(handle.agent_id.clone(), handle);
    }

    pub async fn release(&self, agent_id: &str) {
        let mut agents = self.agents.write().await;
        agents.remove(agent_id);
    }

    pub async fn list(&self) -> Vec<RemoteAgentHandle> {
        let agents = self.agents.read().await;
        agents.values().cloned().collect()
    }
}
