//! Progress events and their fan-out to live subscribers.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};

use crate::models::{ExecutionRecord, ExecutionStatus};

/// A progress snapshot of one run, broadcast to every subscriber after
/// each step and once more at the terminal state.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub run_id: String,
    pub status: ExecutionStatus,
    pub current_step: Option<u32>,
    pub total_steps: u32,
    pub results: serde_json::Map<String, serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl WorkflowEvent {
    pub fn from_record(record: &ExecutionRecord) -> Self {
        Self {
            event_type: "workflow_update".to_string(),
            run_id: record.run_id.clone(),
            status: record.status,
            current_step: record.current_step,
            total_steps: record.total_steps,
            results: record.results.clone(),
            error: record.error.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Fan-out publisher for live subscribers (WebSocket connections).
///
/// Delivery is best-effort and at-most-once: a subscriber whose channel
/// has closed is dropped from the set after the broadcast pass. No retry,
/// no backpressure.
#[derive(Clone)]
pub struct ProgressBroadcaster {
    subscribers: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<String>>>>,
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressBroadcaster {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a new subscriber. Returns its id and the receiving end
    /// the transport task should drain.
    pub async fn subscribe(&self) -> (String, mpsc::UnboundedReceiver<String>) {
        let id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(id.clone(), tx);
        tracing::debug!(subscriber = %id, total = subscribers.len(), "subscriber added");
        (id, rx)
    }

    pub async fn unsubscribe(&self, id: &str) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.remove(id);
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Serialize `event` once and attempt delivery to every subscriber.
    /// Subscribers whose delivery fails are removed after the pass.
    pub async fn publish(&self, event: &WorkflowEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("failed to serialize progress event: {}", e);
                return;
            }
        };

        let mut subscribers = self.subscribers.write().await;
        let mut disconnected: Vec<String> = Vec::new();

        for (id, tx) in subscribers.iter() {
            if tx.send(payload.clone()).is_err() {
                disconnected.push(id.clone());
            }
        }

        for id in disconnected {
            tracing::debug!(subscriber = %id, "dropping disconnected subscriber");
            subscribers.remove(&id);
        }
    }
}
