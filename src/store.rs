//! Flow definition storage boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthoringError;
use crate::types::Flow;

/// Persistence for flow definitions. The service layer validates before it
/// saves; the store only keeps and hands back definitions.
#[async_trait]
pub trait FlowStore: Send + Sync {
  /// Inserts or replaces the flow under its id.
  async fn save(&self, flow: Flow) -> Result<(), AuthoringError>;

  async fn get(&self, id: Uuid) -> Option<Flow>;

  /// All flows, newest first.
  async fn list(&self) -> Vec<Flow>;

  /// Removes the flow and, by ownership, its operations and connections.
  async fn delete(&self, id: Uuid) -> Result<(), AuthoringError>;
}

/// In-memory store, the default for tests and embedded use.
#[derive(Default)]
pub struct MemoryFlowStore {
  flows: tokio::sync::RwLock<HashMap<Uuid, Flow>>,
}

impl MemoryFlowStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl FlowStore for MemoryFlowStore {
  async fn save(&self, flow: Flow) -> Result<(), AuthoringError> {
    self.flows.write().await.insert(flow.id, flow);
    Ok(())
  }

  async fn get(&self, id: Uuid) -> Option<Flow> {
    self.flows.read().await.get(&id).cloned()
  }

  async fn list(&self) -> Vec<Flow> {
    let flows = self.flows.read().await;
    let mut all: Vec<Flow> = flows.values().cloned().collect();
    all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    all
  }

  async fn delete(&self, id: Uuid) -> Result<(), AuthoringError> {
    match self.flows.write().await.remove(&id) {
      Some(_) => Ok(()),
      None => Err(AuthoringError::FlowNotFound(id)),
    }
  }
}
