//! In-memory execution registry.
//!
//! Maps run identifiers to their records for the lifetime of the process.
//! Each entry also carries the run's cancellation token: a soft cancel
//! flips the record to `cancelled` and triggers the token, which the
//! engine checks at every step boundary. Records are never deleted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::AutomatorError;
use crate::models::{ExecutionRecord, ExecutionStatus};

struct RunEntry {
    record: ExecutionRecord,
    cancel: CancellationToken,
}

/// Thread-safe registry of all runs, shared between the HTTP handlers and
/// the engine tasks.
#[derive(Clone)]
pub struct ExecutionStore {
    inner: Arc<RwLock<HashMap<String, RunEntry>>>,
}

impl Default for ExecutionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a new run with status `queued`.
    pub async fn create(&self, run_id: &str, total_steps: u32) -> ExecutionRecord {
        let record = ExecutionRecord::new(run_id.to_string(), total_steps);
        let mut inner = self.inner.write().await;
        inner.insert(
            run_id.to_string(),
            RunEntry {
                record: record.clone(),
                cancel: CancellationToken::new(),
            },
        );
        record
    }

    /// Snapshot of one record.
    pub async fn get(&self, run_id: &str) -> Result<ExecutionRecord, AutomatorError> {
        let inner = self.inner.read().await;
        inner
            .get(run_id)
            .map(|e| e.record.clone())
            .ok_or_else(|| AutomatorError::NotFound("Execution not found".to_string()))
    }

    /// Snapshots of all records, in no guaranteed order.
    pub async fn list(&self) -> Vec<ExecutionRecord> {
        let inner = self.inner.read().await;
        inner.values().map(|e| e.record.clone()).collect()
    }

    /// Soft cancel. A `running` run transitions to `cancelled` and its
    /// token fires, stopping the engine before its next step. Any other
    /// status is a no-op — the cancel is a signal, not a preemption.
    pub async fn cancel(&self, run_id: &str) -> Result<(), AutomatorError> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .get_mut(run_id)
            .ok_or_else(|| AutomatorError::NotFound("Execution not found".to_string()))?;

        if entry.record.status == ExecutionStatus::Running {
            entry.record.status = ExecutionStatus::Cancelled;
            entry.record.completed_at = Some(Utc::now());
            entry.cancel.cancel();
            tracing::info!(run_id, "execution cancelled");
        }
        Ok(())
    }

    /// The run's cancellation token, for the engine task.
    pub async fn cancel_token(&self, run_id: &str) -> Result<CancellationToken, AutomatorError> {
        let inner = self.inner.read().await;
        inner
            .get(run_id)
            .map(|e| e.cancel.clone())
            .ok_or_else(|| AutomatorError::NotFound("Execution not found".to_string()))
    }

    /// Mutate a record in place and return the post-mutation snapshot.
    ///
    /// Terminal records are left untouched (the unchanged snapshot is
    /// returned): once a run is `completed`, `failed`, or `cancelled`,
    /// nothing — including its own engine — may move it again.
    pub async fn update<F>(&self, run_id: &str, f: F) -> Result<ExecutionRecord, AutomatorError>
    where
        F: FnOnce(&mut ExecutionRecord),
    {
        let mut inner = self.inner.write().await;
        let entry = inner
            .get_mut(run_id)
            .ok_or_else(|| AutomatorError::NotFound("Execution not found".to_string()))?;

        if !entry.record.status.is_terminal() {
            f(&mut entry.record);
        }
        Ok(entry.record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = ExecutionStore::new();
        store.create("r1", 3).await;

        let rec = store.get("r1").await.unwrap();
        assert_eq!(rec.status, ExecutionStatus::Queued);
        assert_eq!(rec.total_steps, 3);
        assert!(rec.current_step.is_none());
        assert!(rec.results.is_empty());
        assert!(rec.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let store = ExecutionStore::new();
        assert!(matches!(
            store.get("nope").await,
            Err(AutomatorError::NotFound(_))
        ));
        assert!(matches!(
            store.cancel("nope").await,
            Err(AutomatorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_running_run() {
        let store = ExecutionStore::new();
        store.create("r1", 1).await;
        store
            .update("r1", |r| r.status = ExecutionStatus::Running)
            .await
            .unwrap();

        let token = store.cancel_token("r1").await.unwrap();
        assert!(!token.is_cancelled());

        store.cancel("r1").await.unwrap();
        let rec = store.get("r1").await.unwrap();
        assert_eq!(rec.status, ExecutionStatus::Cancelled);
        assert!(rec.completed_at.is_some());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_non_running_is_noop() {
        let store = ExecutionStore::new();
        store.create("r1", 1).await;

        store.cancel("r1").await.unwrap();
        let rec = store.get("r1").await.unwrap();
        assert_eq!(rec.status, ExecutionStatus::Queued);
        assert!(rec.completed_at.is_none());

        // Terminal records are equally untouched.
        store
            .update("r1", |r| r.status = ExecutionStatus::Running)
            .await
            .unwrap();
        store
            .update("r1", |r| {
                r.status = ExecutionStatus::Completed;
                r.completed_at = Some(Utc::now());
            })
            .await
            .unwrap();
        store.cancel("r1").await.unwrap();
        let rec = store.get("r1").await.unwrap();
        assert_eq!(rec.status, ExecutionStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_refuses_terminal_records() {
        let store = ExecutionStore::new();
        store.create("r1", 1).await;
        store
            .update("r1", |r| r.status = ExecutionStatus::Running)
            .await
            .unwrap();
        store.cancel("r1").await.unwrap();

        // A late engine write must not resurrect the run.
        let rec = store
            .update("r1", |r| r.status = ExecutionStatus::Completed)
            .await
            .unwrap();
        assert_eq!(rec.status, ExecutionStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_list_returns_all_records() {
        let store = ExecutionStore::new();
        store.create("r1", 1).await;
        store.create("r2", 2).await;

        let all = store.list().await;
        assert_eq!(all.len(), 2);
    }
}
