//! Execution persistence boundary.
//!
//! The recorder carries no business logic: the engine drives it as
//! `begin` → (per operation: append running entry, append finalized entry,
//! `update`) → `finalize`. Each log append is all-or-nothing — the audit
//! trail is the only replay and debugging aid, so a partially written entry
//! is worse than a missing one.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::RecorderError;
use crate::types::{Execution, ExecutionLogEntry};

/// Write side, driven by the traversal engine.
#[async_trait]
pub trait ExecutionRecorder: Send + Sync {
  /// Persists a freshly started execution.
  async fn begin(&self, execution: &Execution) -> Result<(), RecorderError>;

  /// Appends one log entry. An entry with a known id settles the `running`
  /// entry written at dispatch; a finalized entry is never touched again.
  async fn append_log(&self, entry: &ExecutionLogEntry) -> Result<(), RecorderError>;

  /// Persists the execution's latest chain snapshot mid-run.
  async fn update(&self, execution: &Execution) -> Result<(), RecorderError>;

  /// Persists the terminal execution record.
  async fn finalize(&self, execution: &Execution) -> Result<(), RecorderError>;
}

/// Page request for execution listings.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
  /// 1-based page number.
  pub page: usize,
  pub per_page: usize,
}

impl Default for Pagination {
  fn default() -> Self {
    Self {
      page: 1,
      per_page: 25,
    }
  }
}

/// Read side, for the authoring/inspection surface.
#[async_trait]
pub trait ExecutionQuery: Send + Sync {
  async fn execution(&self, id: Uuid) -> Option<Execution>;

  /// Executions of one flow, most recent first.
  async fn executions_for_flow(&self, flow_id: Uuid, page: Pagination) -> Vec<Execution>;

  /// Log entries of one execution, in append order.
  async fn logs(&self, execution_id: Uuid) -> Vec<ExecutionLogEntry>;
}

/// In-memory recorder, the default for tests and embedded use.
#[derive(Default)]
pub struct MemoryRecorder {
  executions: Mutex<HashMap<Uuid, Execution>>,
  logs: Mutex<HashMap<Uuid, Vec<ExecutionLogEntry>>>,
}

impl MemoryRecorder {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ExecutionRecorder for MemoryRecorder {
  async fn begin(&self, execution: &Execution) -> Result<(), RecorderError> {
    self
      .executions
      .lock()
      .await
      .insert(execution.id, execution.clone());
    Ok(())
  }

  async fn append_log(&self, entry: &ExecutionLogEntry) -> Result<(), RecorderError> {
    let mut logs = self.logs.lock().await;
    let entries = logs.entry(entry.execution_id).or_default();
    match entries.iter_mut().find(|e| e.id == entry.id) {
      Some(existing) => *existing = entry.clone(),
      None => entries.push(entry.clone()),
    }
    Ok(())
  }

  async fn update(&self, execution: &Execution) -> Result<(), RecorderError> {
    self
      .executions
      .lock()
      .await
      .insert(execution.id, execution.clone());
    Ok(())
  }

  async fn finalize(&self, execution: &Execution) -> Result<(), RecorderError> {
    self
      .executions
      .lock()
      .await
      .insert(execution.id, execution.clone());
    Ok(())
  }
}

#[async_trait]
impl ExecutionQuery for MemoryRecorder {
  async fn execution(&self, id: Uuid) -> Option<Execution> {
    self.executions.lock().await.get(&id).cloned()
  }

  async fn executions_for_flow(&self, flow_id: Uuid, page: Pagination) -> Vec<Execution> {
    let executions = self.executions.lock().await;
    let mut matching: Vec<Execution> = executions
      .values()
      .filter(|e| e.flow_id == flow_id)
      .cloned()
      .collect();
    matching.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
    let skip = page.page.saturating_sub(1) * page.per_page;
    matching.into_iter().skip(skip).take(page.per_page).collect()
  }

  async fn logs(&self, execution_id: Uuid) -> Vec<ExecutionLogEntry> {
    self
      .logs
      .lock()
      .await
      .get(&execution_id)
      .cloned()
      .unwrap_or_default()
  }
}
