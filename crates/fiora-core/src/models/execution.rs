//! Execution state: the status state machine and the per-run record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Run status state machine:
/// `queued → running → {completed | failed}`, with `cancelled` reachable
/// from `running` via the registry's soft cancel. Terminal states are
/// never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// The mutable state of one run. Owned by the engine for the run's
/// lifetime; readable by anyone through the registry. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub run_id: String,
    pub status: ExecutionStatus,
    pub current_step: Option<u32>,
    pub total_steps: u32,
    /// Step results keyed `step_1..step_n`, plus `agent_id`. Append-only.
    pub results: serde_json::Map<String, serde_json::Value>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExecutionRecord {
    pub fn new(run_id: String, total_steps: u32) -> Self {
        Self {
            run_id,
            status: ExecutionStatus::Queued,
            current_step: None,
            total_steps,
            results: serde_json::Map::new(),
            error: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }
}
