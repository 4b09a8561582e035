//! Sleep operation: suspend the current execution for a bounded duration.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::registry::{OperationContext, OperationHandler};
use crate::types::OperationResult;

/// Upper bound on a single sleep; longer authored values are clamped.
const MAX_SLEEP_MS: u64 = 3_600_000;

/// Suspends only this execution — concurrent runs keep going. Wakes early
/// when the run is cancelled; the engine then settles the cancellation before
/// the next dispatch.
pub struct SleepOperation;

#[async_trait]
impl OperationHandler for SleepOperation {
  fn operation_type(&self) -> &'static str {
    "sleep"
  }

  fn default_options(&self) -> Value {
    json!({ "duration_ms": 1000 })
  }

  fn options_schema(&self) -> Value {
    json!({
      "duration_ms": { "type": "integer", "description": "milliseconds to pause, capped at one hour" }
    })
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult {
    let requested = options
      .get("duration_ms")
      .and_then(Value::as_u64)
      .unwrap_or(1000);
    let duration_ms = requested.min(MAX_SLEEP_MS);
    tracing::debug!(duration_ms, operation_key = %ctx.operation_key, "sleep");
    let interrupted = tokio::select! {
      _ = tokio::time::sleep(Duration::from_millis(duration_ms)) => false,
      _ = ctx.cancellation.cancelled() => true,
    };
    OperationResult::success(json!({
      "slept_ms": duration_ms,
      "interrupted": interrupted,
    }))
  }
}
