//! Operation registry: string-keyed dispatch to pluggable operation handlers.
//!
//! The traversal engine stays free of type-specific branching; it looks the
//! handler up by `operation_type` and calls [OperationHandler::execute]. The
//! registry ships the built-in catalogue and stays open for extension via
//! [OperationRegistry::register].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::modules::{ModuleResolver, NotificationSender, SubWorkflowRunner};
use crate::operations;
use crate::types::OperationResult;

/// Shared collaborator bundle handed to every operation.
pub struct EngineServices {
  pub modules: Arc<dyn ModuleResolver>,
  pub notifications: Arc<dyn NotificationSender>,
  pub workflows: Arc<dyn SubWorkflowRunner>,
  /// One client for all `http_request` operations; reqwest pools internally.
  pub http: reqwest::Client,
}

impl EngineServices {
  pub fn new(
    modules: Arc<dyn ModuleResolver>,
    notifications: Arc<dyn NotificationSender>,
    workflows: Arc<dyn SubWorkflowRunner>,
  ) -> Self {
    Self {
      modules,
      notifications,
      workflows,
      http: reqwest::Client::new(),
    }
  }

  /// Services with no external collaborators wired in. CRUD, notification and
  /// sub-workflow operations fail with a clear message; everything else runs.
  pub fn detached() -> Self {
    Self::new(
      Arc::new(crate::modules::NoModules),
      Arc::new(crate::modules::NoNotifications),
      Arc::new(crate::modules::NoSubWorkflows),
    )
  }
}

/// What an executing operation can see: the live chain snapshot, its own
/// identity, the collaborator bundle and the run's cancellation token.
pub struct OperationContext {
  pub execution_id: Uuid,
  pub operation_key: String,
  pub chain: Value,
  pub services: Arc<EngineServices>,
  pub cancellation: CancellationToken,
}

/// Contract every operation type implements. `execute` receives options that
/// are already merged over [OperationHandler::default_options] and
/// interpolated against the chain; it must translate every fault into a
/// failed [OperationResult] rather than returning or propagating an error.
#[async_trait]
pub trait OperationHandler: Send + Sync {
  /// Unique catalogue key, e.g. `condition` or `http_request`.
  fn operation_type(&self) -> &'static str;

  /// Options filled in when the author leaves them out.
  fn default_options(&self) -> Value {
    json!({})
  }

  /// Describes the authored options for the editing surface.
  fn options_schema(&self) -> Value {
    json!({})
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult;
}

/// Maps operation-type identifiers to their handlers.
pub struct OperationRegistry {
  handlers: HashMap<&'static str, Arc<dyn OperationHandler>>,
}

impl OperationRegistry {
  /// Empty registry; use [OperationRegistry::with_builtins] for the standard
  /// catalogue.
  pub fn new() -> Self {
    Self {
      handlers: HashMap::new(),
    }
  }

  /// Registry preloaded with the built-in operation set.
  pub fn with_builtins() -> Self {
    let mut registry = Self::new();
    for handler in operations::builtins() {
      registry.register(handler);
    }
    registry
  }

  /// Registers (or replaces) a handler under its operation type.
  pub fn register(&mut self, handler: Arc<dyn OperationHandler>) {
    self.handlers.insert(handler.operation_type(), handler);
  }

  pub fn get(&self, operation_type: &str) -> Option<Arc<dyn OperationHandler>> {
    self.handlers.get(operation_type).cloned()
  }

  pub fn contains(&self, operation_type: &str) -> bool {
    self.handlers.contains_key(operation_type)
  }

  /// Registered type keys, sorted for stable listings.
  pub fn types(&self) -> Vec<&'static str> {
    let mut types: Vec<&'static str> = self.handlers.keys().copied().collect();
    types.sort_unstable();
    types
  }
}

impl Default for OperationRegistry {
  fn default() -> Self {
    Self::with_builtins()
  }
}

/// Shallow merge of authored options over handler defaults: top-level keys
/// from `authored` win, everything else keeps the default.
pub(crate) fn merge_options(defaults: Value, authored: &Value) -> Value {
  match (defaults, authored) {
    (Value::Object(mut base), Value::Object(overrides)) => {
      for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
      }
      Value::Object(base)
    }
    (defaults, Value::Null) => defaults,
    (_, authored) => authored.clone(),
  }
}
