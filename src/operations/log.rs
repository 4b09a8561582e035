//! Log operation: diagnostic entry in the run's trace. Always succeeds.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::registry::{OperationContext, OperationHandler};
use crate::types::OperationResult;

/// Emits `options.message` (post-interpolation) as a tracing event at the
/// authored level.
pub struct LogOperation;

#[async_trait]
impl OperationHandler for LogOperation {
  fn operation_type(&self) -> &'static str {
    "log"
  }

  fn default_options(&self) -> Value {
    json!({ "message": "", "level": "info" })
  }

  fn options_schema(&self) -> Value {
    json!({
      "message": { "type": "string" },
      "level": { "type": "string", "description": "trace/debug/info/warn/error" }
    })
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult {
    let message = options
      .get("message")
      .and_then(Value::as_str)
      .unwrap_or("")
      .to_string();
    let level = options.get("level").and_then(Value::as_str).unwrap_or("info");
    match level {
      "trace" => tracing::trace!(operation_key = %ctx.operation_key, "{message}"),
      "debug" => tracing::debug!(operation_key = %ctx.operation_key, "{message}"),
      "warn" => tracing::warn!(operation_key = %ctx.operation_key, "{message}"),
      "error" => tracing::error!(operation_key = %ctx.operation_key, "{message}"),
      _ => tracing::info!(operation_key = %ctx.operation_key, "{message}"),
    }
    OperationResult::success(json!({ "message": message }))
  }
}
