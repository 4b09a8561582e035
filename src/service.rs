//! Authoring and execution facade over the store, the engine and the
//! recorder.
//!
//! Definitions are validated at save time so runs never trip over malformed
//! graphs; the engine only double-checks what validation cannot freeze (a
//! registry that changed after the flow was saved).

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::engine::{FlowEngine, TriggerInvocation};
use crate::error::{AuthoringError, ExecuteError};
use crate::recorder::{ExecutionQuery, Pagination};
use crate::registry::OperationRegistry;
use crate::store::FlowStore;
use crate::types::{
  ConnectionSource, Execution, ExecutionLogEntry, Flow, FlowStatus,
};

/// One front door for flow authoring, inspection and manual execution.
pub struct FlowService {
  store: Arc<dyn FlowStore>,
  registry: Arc<OperationRegistry>,
  engine: Arc<FlowEngine>,
  query: Arc<dyn ExecutionQuery>,
}

impl FlowService {
  pub fn new(
    store: Arc<dyn FlowStore>,
    registry: Arc<OperationRegistry>,
    engine: Arc<FlowEngine>,
    query: Arc<dyn ExecutionQuery>,
  ) -> Self {
    Self {
      store,
      registry,
      engine,
      query,
    }
  }

  /// Validates and stores a new flow definition.
  #[instrument(level = "trace", skip(self, flow), fields(flow_id = %flow.id))]
  pub async fn create_flow(&self, flow: Flow) -> Result<Flow, AuthoringError> {
    self.validate(&flow)?;
    self.store.save(flow.clone()).await?;
    info!(flow_id = %flow.id, name = %flow.name, "flow created");
    Ok(flow)
  }

  /// Validates and replaces an existing flow definition. Runs already in
  /// flight keep their copy of the old definition.
  #[instrument(level = "trace", skip(self, flow), fields(flow_id = %flow.id))]
  pub async fn update_flow(&self, mut flow: Flow) -> Result<Flow, AuthoringError> {
    if self.store.get(flow.id).await.is_none() {
      return Err(AuthoringError::FlowNotFound(flow.id));
    }
    self.validate(&flow)?;
    flow.updated_at = chrono::Utc::now();
    self.store.save(flow.clone()).await?;
    info!(flow_id = %flow.id, name = %flow.name, "flow updated");
    Ok(flow)
  }

  pub async fn flow(&self, id: Uuid) -> Result<Flow, AuthoringError> {
    self.store.get(id).await.ok_or(AuthoringError::FlowNotFound(id))
  }

  pub async fn flows(&self) -> Vec<Flow> {
    self.store.list().await
  }

  /// Deep-copies a flow as a new draft: fresh flow and operation ids, with
  /// connections remapped onto the new operation ids.
  #[instrument(level = "trace", skip(self))]
  pub async fn duplicate_flow(&self, id: Uuid) -> Result<Flow, AuthoringError> {
    let source = self.flow(id).await?;
    let mut copy = source.clone();
    copy.id = Uuid::new_v4();
    copy.name = format!("{} (copy)", source.name);
    copy.status = FlowStatus::Draft;
    let now = chrono::Utc::now();
    copy.created_at = now;
    copy.updated_at = now;

    let mut id_map = std::collections::HashMap::new();
    for operation in &mut copy.operations {
      let fresh = Uuid::new_v4();
      id_map.insert(operation.id, fresh);
      operation.id = fresh;
    }
    for connection in &mut copy.connections {
      connection.id = Uuid::new_v4();
      if let ConnectionSource::Operation(op_id) = connection.source {
        if let Some(fresh) = id_map.get(&op_id) {
          connection.source = ConnectionSource::Operation(*fresh);
        }
      }
      if let Some(fresh) = id_map.get(&connection.target_id) {
        connection.target_id = *fresh;
      }
    }

    self.store.save(copy.clone()).await?;
    info!(source_id = %id, copy_id = %copy.id, "flow duplicated");
    Ok(copy)
  }

  pub async fn delete_flow(&self, id: Uuid) -> Result<(), AuthoringError> {
    self.store.delete(id).await?;
    info!(flow_id = %id, "flow deleted");
    Ok(())
  }

  /// Runs an active flow to completion. The definition is cloned at start, so
  /// a concurrent edit never changes a run mid-flight.
  #[instrument(level = "trace", skip(self, trigger))]
  pub async fn execute(
    &self,
    flow_id: Uuid,
    trigger: TriggerInvocation,
  ) -> Result<Execution, ExecuteError> {
    let flow = self
      .store
      .get(flow_id)
      .await
      .ok_or(ExecuteError::FlowNotFound(flow_id))?;
    if flow.status != FlowStatus::Active {
      return Err(ExecuteError::FlowNotActive {
        flow_id,
        status: flow.status.to_string(),
      });
    }
    Ok(self.engine.run(&flow, trigger).await)
  }

  pub async fn execution(&self, id: Uuid) -> Option<Execution> {
    self.query.execution(id).await
  }

  pub async fn executions(&self, flow_id: Uuid, page: Pagination) -> Vec<Execution> {
    self.query.executions_for_flow(flow_id, page).await
  }

  pub async fn execution_logs(&self, execution_id: Uuid) -> Vec<ExecutionLogEntry> {
    self.query.logs(execution_id).await
  }

  /// Structural validation: non-empty unique keys, known operation types and
  /// no dangling connection endpoints.
  fn validate(&self, flow: &Flow) -> Result<(), AuthoringError> {
    let mut keys = HashSet::new();
    for operation in &flow.operations {
      if operation.key.trim().is_empty() {
        return Err(AuthoringError::EmptyOperationKey {
          operation_id: operation.id,
        });
      }
      if operation.key.starts_with('$') {
        return Err(AuthoringError::ReservedOperationKey {
          key: operation.key.clone(),
        });
      }
      if !keys.insert(operation.key.as_str()) {
        return Err(AuthoringError::DuplicateOperationKey {
          key: operation.key.clone(),
        });
      }
      if !self.registry.contains(&operation.operation_type) {
        return Err(AuthoringError::UnknownOperationType {
          key: operation.key.clone(),
          operation_type: operation.operation_type.clone(),
        });
      }
    }

    let operation_ids: HashSet<Uuid> = flow.operations.iter().map(|op| op.id).collect();
    for connection in &flow.connections {
      if let ConnectionSource::Operation(op_id) = connection.source {
        if !operation_ids.contains(&op_id) {
          return Err(AuthoringError::MissingConnectionSource {
            connection_id: connection.id,
            operation_id: op_id,
          });
        }
      }
      if !operation_ids.contains(&connection.target_id) {
        return Err(AuthoringError::MissingConnectionTarget {
          connection_id: connection.id,
          operation_id: connection.target_id,
        });
      }
    }
    Ok(())
  }
}
