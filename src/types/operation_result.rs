//! Result of executing a single operation.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// What an operation handler hands back to the traversal engine. Handlers
/// never return `Err`; faults are translated into `success: false` here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
  pub success: bool,
  #[serde(default)]
  pub data: Option<Value>,
  #[serde(default)]
  pub error: Option<String>,
  #[serde(default)]
  pub error_stack: Option<String>,
}

impl OperationResult {
  pub fn success(data: Value) -> Self {
    Self {
      success: true,
      data: Some(data),
      error: None,
      error_stack: None,
    }
  }

  /// Success with no payload; merges as null into the chain.
  pub fn success_empty() -> Self {
    Self {
      success: true,
      data: None,
      error: None,
      error_stack: None,
    }
  }

  pub fn failure(error: impl Into<String>) -> Self {
    Self {
      success: false,
      data: None,
      error: Some(error.into()),
      error_stack: None,
    }
  }

  pub fn failure_with_stack(error: impl Into<String>, stack: impl Into<String>) -> Self {
    Self {
      success: false,
      data: None,
      error: Some(error.into()),
      error_stack: Some(stack.into()),
    }
  }

  /// The value merged into the chain under the operation key (and `$last`):
  /// the data payload on success, an `{ error }` object on failure so
  /// downstream failure branches can interpolate it.
  pub fn chain_value(&self) -> Value {
    if self.success {
      self.data.clone().unwrap_or(Value::Null)
    } else {
      json!({ "error": self.error })
    }
  }
}
