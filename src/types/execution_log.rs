//! Append-only audit trail of operation invocations within one execution.
//!
//! An entry is created the moment an operation is dispatched (status
//! `running`) and finalized exactly once when it completes. The ordered log
//! plus the execution record is the sole surface for diagnosing why a run
//! stopped where it did — there is no automatic compensation to replay.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::OperationResult;

/// Status of one log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
  Running,
  Success,
  Failure,
  Skipped,
}

impl fmt::Display for LogStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LogStatus::Running => write!(f, "running"),
      LogStatus::Success => write!(f, "success"),
      LogStatus::Failure => write!(f, "failure"),
      LogStatus::Skipped => write!(f, "skipped"),
    }
  }
}

/// One recorded operation invocation. `input_data` is the interpolated
/// options snapshot taken at dispatch; `output_data` the result payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
  pub id: Uuid,
  pub execution_id: Uuid,
  #[serde(default)]
  pub operation_id: Option<Uuid>,
  pub operation_key: String,
  pub status: LogStatus,
  pub input_data: Value,
  #[serde(default)]
  pub output_data: Option<Value>,
  #[serde(default)]
  pub error: Option<String>,
  #[serde(default)]
  pub error_stack: Option<String>,
  #[serde(default)]
  pub duration_ms: Option<u64>,
  pub executed_at: DateTime<Utc>,
}

impl ExecutionLogEntry {
  /// Entry written when an operation begins.
  pub fn begin(
    execution_id: Uuid,
    operation_id: Option<Uuid>,
    operation_key: impl Into<String>,
    input_data: Value,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      execution_id,
      operation_id,
      operation_key: operation_key.into(),
      status: LogStatus::Running,
      input_data,
      output_data: None,
      error: None,
      error_stack: None,
      duration_ms: None,
      executed_at: Utc::now(),
    }
  }

  /// Finalized copy of this entry carrying the operation result. The entry id
  /// is kept so the recorder can settle the `running` entry it already wrote.
  pub fn finalized(&self, result: &OperationResult, duration_ms: u64) -> Self {
    let mut entry = self.clone();
    entry.status = if result.success {
      LogStatus::Success
    } else {
      LogStatus::Failure
    };
    entry.output_data = result.data.clone();
    entry.error = result.error.clone();
    entry.error_stack = result.error_stack.clone();
    entry.duration_ms = Some(duration_ms);
    entry
  }
}
