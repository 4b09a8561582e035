//! A directed, optionally conditional edge between two operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Where a connection originates: the synthetic trigger node or an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConnectionSource {
  /// The synthetic entry node every traversal starts from.
  Trigger,
  /// An operation id within the same flow.
  Operation(Uuid),
}

impl From<ConnectionSource> for String {
  fn from(source: ConnectionSource) -> String {
    source.to_string()
  }
}

impl TryFrom<String> for ConnectionSource {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    if value == "trigger" {
      return Ok(ConnectionSource::Trigger);
    }
    Uuid::parse_str(&value)
      .map(ConnectionSource::Operation)
      .map_err(|e| format!("invalid connection source \"{value}\": {e}"))
  }
}

impl fmt::Display for ConnectionSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConnectionSource::Trigger => write!(f, "trigger"),
      ConnectionSource::Operation(id) => write!(f, "{id}"),
    }
  }
}

/// Classifies an edge: followed after a matching outcome, or as fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
  Success,
  Failure,
  Default,
}

impl fmt::Display for ConnectionType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConnectionType::Success => write!(f, "success"),
      ConnectionType::Failure => write!(f, "failure"),
      ConnectionType::Default => write!(f, "default"),
    }
  }
}

/// A graph edge within one flow. `label` is display metadata only; the
/// optional `condition` is a filter rule evaluated against the live chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
  pub id: Uuid,
  pub source: ConnectionSource,
  pub target_id: Uuid,
  pub connection_type: ConnectionType,
  #[serde(default)]
  pub condition: Option<Value>,
  #[serde(default)]
  pub label: Option<String>,
  /// Tie-break among otherwise equally qualified edges (then edge id).
  #[serde(default)]
  pub sort_order: i32,
}

impl Connection {
  /// Unconditional edge of the given type.
  pub fn new(source: ConnectionSource, target_id: Uuid, connection_type: ConnectionType) -> Self {
    Self {
      id: Uuid::new_v4(),
      source,
      target_id,
      connection_type,
      condition: None,
      label: None,
      sort_order: 0,
    }
  }

  /// Attaches a filter-rule condition to the edge.
  pub fn with_condition(mut self, condition: Value) -> Self {
    self.condition = Some(condition);
    self
  }

  /// Sets the edge tie-break order.
  pub fn with_sort_order(mut self, sort_order: i32) -> Self {
    self.sort_order = sort_order;
    self
  }
}
