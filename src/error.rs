//! Error taxonomy for authoring, execution and collaborator boundaries.
//!
//! Operation-level failures are not errors here: an operation reports
//! `success: false` through its result and the graph may recover over a
//! failure edge. These types cover what is rejected at save time
//! ([AuthoringError]), what is fatal to a run ([EngineFault]) and the
//! collaborator contracts.

use thiserror::Error;
use uuid::Uuid;

/// Malformed flow definitions, rejected when a flow is saved — never at run
/// time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthoringError {
  #[error("operation key must not be empty (operation {operation_id})")]
  EmptyOperationKey { operation_id: Uuid },
  #[error("operation key \"{key}\" uses the reserved '$' prefix")]
  ReservedOperationKey { key: String },
  #[error("duplicate operation key \"{key}\"")]
  DuplicateOperationKey { key: String },
  #[error("unknown operation type \"{operation_type}\" (operation \"{key}\")")]
  UnknownOperationType { key: String, operation_type: String },
  #[error("connection {connection_id} references missing source operation {operation_id}")]
  MissingConnectionSource {
    connection_id: Uuid,
    operation_id: Uuid,
  },
  #[error("connection {connection_id} references missing target operation {operation_id}")]
  MissingConnectionTarget {
    connection_id: Uuid,
    operation_id: Uuid,
  },
  #[error("flow {0} not found")]
  FlowNotFound(Uuid),
}

/// Infrastructure faults during a run: always fatal, the execution is marked
/// failed with the fault recorded.
#[derive(Debug, Clone, Error)]
pub enum EngineFault {
  #[error("execution recorder unavailable: {0}")]
  Recorder(String),
  #[error("step limit of {limit} exceeded; aborting run (authored cycle without a terminating condition?)")]
  StepLimitExceeded { limit: u32 },
}

/// Failures raised by the manual execution entry point before a run starts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecuteError {
  #[error("flow {0} not found")]
  FlowNotFound(Uuid),
  #[error("flow {flow_id} is {status}; only active flows can be executed")]
  FlowNotActive { flow_id: Uuid, status: String },
}

/// Errors surfaced by external data modules.
#[derive(Debug, Clone, Error)]
pub enum ModuleError {
  #[error("module \"{module}\" has no {method} method")]
  MethodUnavailable { module: String, method: String },
  #[error("{0}")]
  Failed(String),
}

/// Errors surfaced by the notification collaborator.
#[derive(Debug, Clone, Error)]
#[error("notification send failed: {0}")]
pub struct NotificationError(pub String);

/// Errors surfaced by the sub-workflow runner collaborator.
#[derive(Debug, Clone, Error)]
#[error("sub-workflow run failed: {0}")]
pub struct WorkflowRunError(pub String);

/// Errors surfaced by the execution recorder. A log entry is written fully or
/// not at all; partial writes are a recorder bug, not an engine concern.
#[derive(Debug, Clone, Error)]
#[error("recorder error: {0}")]
pub struct RecorderError(pub String);
