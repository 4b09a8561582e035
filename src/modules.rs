//! External collaborator contracts.
//!
//! The engine consumes these but never implements them: data modules reach
//! the commerce-domain services, the notification sender delivers email and
//! in-app messages, the sub-workflow runner starts other orchestrated
//! processes. Deletion is modeled as explicit capabilities a module opts
//! into, resolved through the trait rather than by probing method names.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ModuleError, NotificationError, WorkflowRunError};

/// Soft-delete capability: archive records without destroying them.
#[async_trait]
pub trait SoftDelete: Send + Sync {
  async fn soft_delete(&self, query: Value) -> Result<Value, ModuleError>;
}

/// Hard-delete capability: destroy records permanently.
#[async_trait]
pub trait HardDelete: Send + Sync {
  async fn delete(&self, query: Value) -> Result<Value, ModuleError>;
}

/// A named external data module the CRUD operations talk to. Deletion
/// capabilities default to absent; `delete_data` prefers soft over hard.
#[async_trait]
pub trait DataModule: Send + Sync {
  async fn create(&self, data: Value) -> Result<Value, ModuleError>;
  async fn read(&self, query: Value) -> Result<Value, ModuleError>;
  async fn update(&self, query: Value, data: Value) -> Result<Value, ModuleError>;

  fn soft_delete(&self) -> Option<&dyn SoftDelete> {
    None
  }

  fn hard_delete(&self) -> Option<&dyn HardDelete> {
    None
  }
}

/// Resolves a module name to its implementation.
pub trait ModuleResolver: Send + Sync {
  fn resolve(&self, name: &str) -> Option<Arc<dyn DataModule>>;
}

/// Outbound notification, email or otherwise.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
  pub to: Vec<String>,
  pub channel: String,
  pub subject: Option<String>,
  pub template: Option<String>,
  pub data: Value,
}

/// Delivery collaborator for `send_email` / `notification`. A failure here is
/// surfaced as an operation failure, never retried by the engine.
#[async_trait]
pub trait NotificationSender: Send + Sync {
  async fn send(&self, message: NotificationMessage) -> Result<(), NotificationError>;
}

/// Request handed to the sub-workflow runner.
#[derive(Debug, Clone)]
pub struct SubWorkflowRequest {
  pub input: Value,
  /// Ties the child run back to the parent execution.
  pub correlation_id: Uuid,
}

/// What a completed sub-workflow run reports back.
#[derive(Debug, Clone)]
pub struct SubWorkflowOutcome {
  pub result: Value,
  pub transaction_id: String,
}

/// Orchestration collaborator for `trigger_workflow`.
#[async_trait]
pub trait SubWorkflowRunner: Send + Sync {
  async fn run(
    &self,
    flow_id: Uuid,
    request: SubWorkflowRequest,
  ) -> Result<SubWorkflowOutcome, WorkflowRunError>;
}

/// Resolver with no modules registered; every lookup misses.
pub struct NoModules;

impl ModuleResolver for NoModules {
  fn resolve(&self, _name: &str) -> Option<Arc<dyn DataModule>> {
    None
  }
}

/// Sender for deployments without a notification collaborator; every send
/// fails so the operation surfaces a clear error instead of vanishing mail.
pub struct NoNotifications;

#[async_trait]
impl NotificationSender for NoNotifications {
  async fn send(&self, _message: NotificationMessage) -> Result<(), NotificationError> {
    Err(NotificationError(
      "no notification sender configured".to_string(),
    ))
  }
}

/// Runner for deployments without sub-workflow orchestration.
pub struct NoSubWorkflows;

#[async_trait]
impl SubWorkflowRunner for NoSubWorkflows {
  async fn run(
    &self,
    _flow_id: Uuid,
    _request: SubWorkflowRequest,
  ) -> Result<SubWorkflowOutcome, WorkflowRunError> {
    Err(WorkflowRunError(
      "no sub-workflow runner configured".to_string(),
    ))
  }
}
