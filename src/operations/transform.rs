//! Transform operation: pure reshaping of chain data.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::registry::{OperationContext, OperationHandler};
use crate::types::OperationResult;

/// Returns `options.json` as the result data. The interpolation the engine
/// already applied is the whole transformation; this handler has no external
/// effects at all.
pub struct TransformOperation;

#[async_trait]
impl OperationHandler for TransformOperation {
  fn operation_type(&self) -> &'static str {
    "transform"
  }

  fn default_options(&self) -> Value {
    json!({ "json": null })
  }

  fn options_schema(&self) -> Value {
    json!({
      "json": { "description": "output structure; placeholders resolve against the chain" }
    })
  }

  async fn execute(&self, options: Value, _ctx: &OperationContext) -> OperationResult {
    OperationResult::success(options.get("json").cloned().unwrap_or(Value::Null))
  }
}
