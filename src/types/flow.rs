//! A stored automation definition: one trigger, operations, connections.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use super::{Connection, ConnectionSource, Operation};

/// Flow lifecycle status. Only active flows accept executions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
  Draft,
  Active,
  Inactive,
}

impl fmt::Display for FlowStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FlowStatus::Draft => write!(f, "draft"),
      FlowStatus::Active => write!(f, "active"),
      FlowStatus::Inactive => write!(f, "inactive"),
    }
  }
}

/// How a flow is started. Dispatch itself (cron, webhook routing, event bus)
/// lives outside the engine; the descriptor is carried for the authoring
/// surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
  Manual,
  Event,
  Schedule,
  Webhook,
  AnotherFlow,
}

/// Trigger descriptor: the type plus opaque trigger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowTrigger {
  pub trigger_type: TriggerType,
  #[serde(default)]
  pub options: Value,
}

impl FlowTrigger {
  pub fn manual() -> Self {
    Self {
      trigger_type: TriggerType::Manual,
      options: json!({}),
    }
  }
}

/// A flow owns its operations and connections (cascade on delete). `layout`
/// is free-form editor metadata and plays no part in execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
  pub id: Uuid,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  pub status: FlowStatus,
  pub trigger: FlowTrigger,
  #[serde(default)]
  pub layout: Value,
  pub operations: Vec<Operation>,
  pub connections: Vec<Connection>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Flow {
  /// New draft flow with a manual trigger and no graph yet.
  pub fn new(name: impl Into<String>) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
      description: None,
      status: FlowStatus::Draft,
      trigger: FlowTrigger::manual(),
      layout: json!({}),
      operations: Vec::new(),
      connections: Vec::new(),
      created_at: now,
      updated_at: now,
    }
  }

  pub fn operation(&self, id: Uuid) -> Option<&Operation> {
    self.operations.iter().find(|op| op.id == id)
  }

  pub fn operation_by_key(&self, key: &str) -> Option<&Operation> {
    self.operations.iter().find(|op| op.key == key)
  }

  /// Outgoing connections of `source`, ordered by sort_order then id so the
  /// traversal tie-break is deterministic.
  pub fn outgoing_connections(&self, source: ConnectionSource) -> Vec<&Connection> {
    let mut edges: Vec<&Connection> = self
      .connections
      .iter()
      .filter(|c| c.source == source)
      .collect();
    edges.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
    edges
  }
}
