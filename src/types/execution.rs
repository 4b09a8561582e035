//! One triggered run of a flow.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Run state machine: `Pending → Running → {Completed | Failed | Cancelled}`.
/// Terminal states have no outgoing transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
  Pending,
  Running,
  Completed,
  Failed,
  Cancelled,
}

impl ExecutionStatus {
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled
    )
  }
}

impl fmt::Display for ExecutionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ExecutionStatus::Pending => write!(f, "pending"),
      ExecutionStatus::Running => write!(f, "running"),
      ExecutionStatus::Completed => write!(f, "completed"),
      ExecutionStatus::Failed => write!(f, "failed"),
      ExecutionStatus::Cancelled => write!(f, "cancelled"),
    }
  }
}

/// Execution record: created when a run starts, mutated by the engine after
/// every operation, immutable once terminal. `chain` is the latest data-chain
/// snapshot; `error` describes why a failed run stopped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
  pub id: Uuid,
  pub flow_id: Uuid,
  pub status: ExecutionStatus,
  pub chain: Value,
  #[serde(default)]
  pub triggered_by: Option<String>,
  pub started_at: DateTime<Utc>,
  #[serde(default)]
  pub finished_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub error: Option<String>,
}

impl Execution {
  /// Pending execution for a flow, before the chain is seeded.
  pub fn pending(flow_id: Uuid, triggered_by: Option<String>) -> Self {
    Self {
      id: Uuid::new_v4(),
      flow_id,
      status: ExecutionStatus::Pending,
      chain: Value::Null,
      triggered_by,
      started_at: Utc::now(),
      finished_at: None,
      error: None,
    }
  }

  /// Moves to a terminal status, stamping `finished_at` and the error.
  pub fn finish(&mut self, status: ExecutionStatus, error: Option<String>) {
    self.status = status;
    self.error = error;
    self.finished_at = Some(Utc::now());
  }
}
