//! Notification operations: email and channel delivery via the external
//! sender. Delivery failures are surfaced, not retried.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::modules::NotificationMessage;
use crate::registry::{OperationContext, OperationHandler};
use crate::types::OperationResult;

/// `options.to` accepts a single address or an array of addresses.
fn recipients(options: &Value) -> Vec<String> {
  match options.get("to") {
    Some(Value::String(one)) => vec![one.clone()],
    Some(Value::Array(many)) => many
      .iter()
      .filter_map(Value::as_str)
      .map(str::to_string)
      .collect(),
    _ => Vec::new(),
  }
}

fn optional_string(options: &Value, key: &str) -> Option<String> {
  options.get(key).and_then(Value::as_str).map(str::to_string)
}

async fn deliver(
  channel: String,
  options: &Value,
  ctx: &OperationContext,
) -> OperationResult {
  let to = recipients(options);
  if to.is_empty() {
    return OperationResult::failure("missing required option \"to\"");
  }
  let message = NotificationMessage {
    to: to.clone(),
    channel: channel.clone(),
    subject: optional_string(options, "subject"),
    template: optional_string(options, "template"),
    data: options.get("data").cloned().unwrap_or(Value::Null),
  };
  tracing::debug!(
    channel = %channel,
    recipients = to.len(),
    operation_key = %ctx.operation_key,
    "sending notification"
  );
  match ctx.services.notifications.send(message).await {
    Ok(()) => OperationResult::success(json!({ "sent": true, "recipients": to })),
    Err(e) => OperationResult::failure(e.to_string()),
  }
}

/// `send_email`: delivery over the email channel.
pub struct SendEmailOperation;

#[async_trait]
impl OperationHandler for SendEmailOperation {
  fn operation_type(&self) -> &'static str {
    "send_email"
  }

  fn options_schema(&self) -> Value {
    json!({
      "to": { "description": "address or array of addresses" },
      "subject": { "type": "string" },
      "template": { "type": "string" },
      "data": { "description": "template payload" }
    })
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult {
    deliver("email".to_string(), &options, ctx).await
  }
}

/// `notification`: delivery over an authored channel (in-app by default).
pub struct NotificationOperation;

#[async_trait]
impl OperationHandler for NotificationOperation {
  fn operation_type(&self) -> &'static str {
    "notification"
  }

  fn default_options(&self) -> Value {
    json!({ "channel": "in_app" })
  }

  fn options_schema(&self) -> Value {
    json!({
      "to": { "description": "recipient or array of recipients" },
      "channel": { "type": "string" },
      "template": { "type": "string" },
      "data": { "description": "template payload" }
    })
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult {
    let channel = options
      .get("channel")
      .and_then(Value::as_str)
      .unwrap_or("in_app")
      .to_string();
    deliver(channel, &options, ctx).await
  }
}
