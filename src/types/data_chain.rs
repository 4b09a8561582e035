//! The append-only record of trigger input and operation results for one run.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::path;

/// Reserved key holding `{ payload, timestamp }` for the triggering input.
pub const TRIGGER_KEY: &str = "$trigger";
/// Reserved key holding `{ triggered_by }`.
pub const ACCOUNTABILITY_KEY: &str = "$accountability";
/// Reserved key holding the injected environment snapshot.
pub const ENV_KEY: &str = "$env";
/// Reserved key aliasing the most recent operation result.
pub const LAST_KEY: &str = "$last";

/// Violation of the chain's append-only discipline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
  #[error("chain key \"{0}\" already exists; operation results are append-only")]
  DuplicateKey(String),
  #[error("chain key \"{0}\" is reserved")]
  ReservedKey(String),
}

/// Data chain for one execution. Grows by one key per executed operation;
/// only `$last` is ever overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataChain {
  root: Value,
}

impl DataChain {
  /// Seeds the chain for a fresh run: trigger payload with a timestamp,
  /// accountability, the injected environment snapshot, and a null `$last`.
  pub fn seed(payload: Value, triggered_by: Option<&str>, env: Value) -> Self {
    let mut root = Map::new();
    root.insert(
      TRIGGER_KEY.to_string(),
      json!({ "payload": payload, "timestamp": Utc::now().to_rfc3339() }),
    );
    root.insert(
      ACCOUNTABILITY_KEY.to_string(),
      json!({ "triggered_by": triggered_by }),
    );
    root.insert(ENV_KEY.to_string(), env);
    root.insert(LAST_KEY.to_string(), Value::Null);
    Self {
      root: Value::Object(root),
    }
  }

  /// Appends one operation result under `key`. Reserved keys and keys that
  /// already exist are rejected.
  pub fn insert(&mut self, key: &str, value: Value) -> Result<(), ChainError> {
    if key.starts_with('$') {
      return Err(ChainError::ReservedKey(key.to_string()));
    }
    let Value::Object(entries) = &mut self.root else {
      return Err(ChainError::ReservedKey(key.to_string()));
    };
    if entries.contains_key(key) {
      return Err(ChainError::DuplicateKey(key.to_string()));
    }
    entries.insert(key.to_string(), value);
    Ok(())
  }

  /// Overwrites the `$last` convenience alias.
  pub fn set_last(&mut self, value: Value) {
    if let Value::Object(entries) = &mut self.root {
      entries.insert(LAST_KEY.to_string(), value);
    }
  }

  /// Root object for path resolution, filter evaluation and interpolation.
  pub fn root(&self) -> &Value {
    &self.root
  }

  /// Resolves a dot/bracket path against the chain.
  pub fn get(&self, path: &str) -> Option<&Value> {
    path::get(&self.root, path)
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self
      .root
      .as_object()
      .map(|entries| entries.contains_key(key))
      .unwrap_or(false)
  }

  /// Owned snapshot, as persisted on the execution record.
  pub fn snapshot(&self) -> Value {
    self.root.clone()
  }
}
