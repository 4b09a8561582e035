//! Data CRUD operations against external modules.
//!
//! Each handler resolves `options.module` through the module resolver and
//! invokes the matching contract method. `delete_data` prefers the
//! soft-delete capability and falls back to hard delete; a module exposing
//! neither fails with an error naming what is missing.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::modules::DataModule;
use crate::registry::{OperationContext, OperationHandler};
use crate::types::OperationResult;

/// Pulls the module name out of interpolated options and resolves it.
fn resolve_module(
  options: &Value,
  ctx: &OperationContext,
) -> Result<(String, Arc<dyn DataModule>), OperationResult> {
  let Some(name) = options.get("module").and_then(Value::as_str) else {
    return Err(OperationResult::failure("missing required option \"module\""));
  };
  match ctx.services.modules.resolve(name) {
    Some(module) => Ok((name.to_string(), module)),
    None => Err(OperationResult::failure(format!("unknown module \"{name}\""))),
  }
}

fn option_or_null(options: &Value, key: &str) -> Value {
  options.get(key).cloned().unwrap_or(Value::Null)
}

/// `create_data`: creates a record via the module's create method.
pub struct CreateDataOperation;

#[async_trait]
impl OperationHandler for CreateDataOperation {
  fn operation_type(&self) -> &'static str {
    "create_data"
  }

  fn options_schema(&self) -> Value {
    json!({
      "module": { "type": "string", "description": "target module name" },
      "data": { "type": "object", "description": "record payload" }
    })
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult {
    let (name, module) = match resolve_module(&options, ctx) {
      Ok(resolved) => resolved,
      Err(failure) => return failure,
    };
    tracing::debug!(module = %name, operation_key = %ctx.operation_key, "create_data");
    match module.create(option_or_null(&options, "data")).await {
      Ok(created) => OperationResult::success(created),
      Err(e) => OperationResult::failure(e.to_string()),
    }
  }
}

/// `read_data`: queries records via the module's read method.
pub struct ReadDataOperation;

#[async_trait]
impl OperationHandler for ReadDataOperation {
  fn operation_type(&self) -> &'static str {
    "read_data"
  }

  fn options_schema(&self) -> Value {
    json!({
      "module": { "type": "string", "description": "target module name" },
      "query": { "type": "object", "description": "selection query" }
    })
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult {
    let (name, module) = match resolve_module(&options, ctx) {
      Ok(resolved) => resolved,
      Err(failure) => return failure,
    };
    tracing::debug!(module = %name, operation_key = %ctx.operation_key, "read_data");
    match module.read(option_or_null(&options, "query")).await {
      Ok(found) => OperationResult::success(found),
      Err(e) => OperationResult::failure(e.to_string()),
    }
  }
}

/// `update_data`: updates records selected by a query.
pub struct UpdateDataOperation;

#[async_trait]
impl OperationHandler for UpdateDataOperation {
  fn operation_type(&self) -> &'static str {
    "update_data"
  }

  fn options_schema(&self) -> Value {
    json!({
      "module": { "type": "string", "description": "target module name" },
      "query": { "type": "object", "description": "selection query" },
      "data": { "type": "object", "description": "fields to update" }
    })
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult {
    let (name, module) = match resolve_module(&options, ctx) {
      Ok(resolved) => resolved,
      Err(failure) => return failure,
    };
    tracing::debug!(module = %name, operation_key = %ctx.operation_key, "update_data");
    let query = option_or_null(&options, "query");
    let data = option_or_null(&options, "data");
    match module.update(query, data).await {
      Ok(updated) => OperationResult::success(updated),
      Err(e) => OperationResult::failure(e.to_string()),
    }
  }
}

/// `delete_data`: soft delete when the module supports it, hard delete
/// otherwise.
pub struct DeleteDataOperation;

#[async_trait]
impl OperationHandler for DeleteDataOperation {
  fn operation_type(&self) -> &'static str {
    "delete_data"
  }

  fn options_schema(&self) -> Value {
    json!({
      "module": { "type": "string", "description": "target module name" },
      "query": { "type": "object", "description": "selection query" }
    })
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult {
    let (name, module) = match resolve_module(&options, ctx) {
      Ok(resolved) => resolved,
      Err(failure) => return failure,
    };
    let query = option_or_null(&options, "query");
    if let Some(soft) = module.soft_delete() {
      tracing::debug!(module = %name, operation_key = %ctx.operation_key, "delete_data (soft)");
      return match soft.soft_delete(query).await {
        Ok(deleted) => OperationResult::success(deleted),
        Err(e) => OperationResult::failure(e.to_string()),
      };
    }
    if let Some(hard) = module.hard_delete() {
      tracing::debug!(module = %name, operation_key = %ctx.operation_key, "delete_data (hard)");
      return match hard.delete(query).await {
        Ok(deleted) => OperationResult::success(deleted),
        Err(e) => OperationResult::failure(e.to_string()),
      };
    }
    OperationResult::failure(format!(
      "module \"{name}\" has no soft_delete or delete method"
    ))
  }
}
