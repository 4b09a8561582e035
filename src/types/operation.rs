//! A single unit of work in a flow.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

/// A graph node. `key` is the handle other operations reference in path
/// expressions and must be unique within its flow; `options` are raw,
/// pre-interpolation. Operations are immutable during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
  pub id: Uuid,
  pub key: String,
  pub operation_type: String,
  pub name: String,
  #[serde(default)]
  pub options: Value,
  /// Tie-break only; carries no execution semantics of its own.
  #[serde(default)]
  pub sort_order: i32,
}

impl Operation {
  pub fn new(key: impl Into<String>, operation_type: impl Into<String>, options: Value) -> Self {
    let key = key.into();
    let operation_type = operation_type.into();
    Self {
      id: Uuid::new_v4(),
      name: key.clone(),
      key,
      operation_type,
      options,
      sort_order: 0,
    }
  }
}

impl Default for Operation {
  fn default() -> Self {
    Operation::new("operation", "log", json!({}))
  }
}
