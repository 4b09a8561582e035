//! Trigger-workflow operation: dispatch a sub-workflow via the orchestration
//! collaborator, optionally awaiting its result.

use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::modules::SubWorkflowRequest;
use crate::registry::{OperationContext, OperationHandler};
use crate::types::OperationResult;

/// Runs the flow named by `options.workflow`. With `wait: true` (the default)
/// the operation resolves with the sub-workflow result; with `wait: false` it
/// dispatches and returns immediately.
pub struct TriggerWorkflowOperation;

#[async_trait]
impl OperationHandler for TriggerWorkflowOperation {
  fn operation_type(&self) -> &'static str {
    "trigger_workflow"
  }

  fn default_options(&self) -> Value {
    json!({ "wait": true, "input": null })
  }

  fn options_schema(&self) -> Value {
    json!({
      "workflow": { "type": "string", "description": "id of the flow to run" },
      "input": { "description": "payload handed to the sub-workflow" },
      "wait": { "type": "boolean", "description": "await the result or fire-and-forget" }
    })
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult {
    let Some(raw_id) = options.get("workflow").and_then(Value::as_str) else {
      return OperationResult::failure("missing required option \"workflow\"");
    };
    let flow_id = match Uuid::parse_str(raw_id) {
      Ok(id) => id,
      Err(_) => return OperationResult::failure(format!("invalid workflow id \"{raw_id}\"")),
    };
    let request = SubWorkflowRequest {
      input: options.get("input").cloned().unwrap_or(Value::Null),
      correlation_id: ctx.execution_id,
    };
    let wait = options.get("wait").and_then(Value::as_bool).unwrap_or(true);
    tracing::debug!(%flow_id, wait, operation_key = %ctx.operation_key, "trigger_workflow");

    if !wait {
      let runner = ctx.services.workflows.clone();
      tokio::spawn(async move {
        if let Err(e) = runner.run(flow_id, request).await {
          tracing::warn!(%flow_id, error = %e, "detached sub-workflow failed");
        }
      });
      return OperationResult::success(json!({ "dispatched": true, "workflow": flow_id }));
    }

    match ctx.services.workflows.run(flow_id, request).await {
      Ok(outcome) => OperationResult::success(json!({
        "result": outcome.result,
        "transaction_id": outcome.transaction_id,
      })),
      Err(e) => OperationResult::failure(e.to_string()),
    }
  }
}
