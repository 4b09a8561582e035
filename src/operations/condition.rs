//! Condition operation: pure branching on a filter rule.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::filter;
use crate::registry::{OperationContext, OperationHandler};
use crate::types::OperationResult;

/// Evaluates `options.filter` against the chain; the result's success mirrors
/// the boolean outcome so success/failure edges do the branching. No side
/// effects.
pub struct ConditionOperation;

#[async_trait]
impl OperationHandler for ConditionOperation {
  fn operation_type(&self) -> &'static str {
    "condition"
  }

  fn default_options(&self) -> Value {
    json!({ "filter": {} })
  }

  fn options_schema(&self) -> Value {
    json!({
      "filter": { "type": "object", "description": "filter rule evaluated against the data chain" }
    })
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult {
    let rule = options.get("filter").cloned().unwrap_or(json!({}));
    let matched = filter::evaluate(&rule, &ctx.chain);
    tracing::debug!(operation_key = %ctx.operation_key, matched, "condition evaluated");
    if matched {
      OperationResult::success(json!({ "matched": true }))
    } else {
      OperationResult::failure("condition was not met")
    }
  }
}
