//! Built-in operation catalogue.
//!
//! One module per handler, mirroring the catalogue the registry ships:
//! branching (`condition`), data CRUD against external modules, outbound
//! HTTP, scripting, notification delivery, data reshaping, sub-workflow
//! dispatch, sleep and diagnostic logging. Every handler follows the same
//! discipline: act on interpolated options and translate any fault into a
//! failed result — nothing escapes `execute`.

use std::sync::Arc;

use crate::registry::OperationHandler;

mod condition;
#[cfg(test)]
mod condition_test;
mod data;
mod http_request;
mod log;
mod notify;
mod run_script;
mod sleep;
mod transform;
mod trigger_workflow;

pub use condition::ConditionOperation;
pub use data::{CreateDataOperation, DeleteDataOperation, ReadDataOperation, UpdateDataOperation};
pub use http_request::HttpRequestOperation;
pub use log::LogOperation;
pub use notify::{NotificationOperation, SendEmailOperation};
pub use run_script::RunScriptOperation;
pub use sleep::SleepOperation;
pub use transform::TransformOperation;
pub use trigger_workflow::TriggerWorkflowOperation;

/// The full built-in set, in catalogue order.
pub fn builtins() -> Vec<Arc<dyn OperationHandler>> {
  vec![
    Arc::new(ConditionOperation),
    Arc::new(CreateDataOperation),
    Arc::new(ReadDataOperation),
    Arc::new(UpdateDataOperation),
    Arc::new(DeleteDataOperation),
    Arc::new(HttpRequestOperation),
    Arc::new(RunScriptOperation),
    Arc::new(SendEmailOperation),
    Arc::new(NotificationOperation),
    Arc::new(TransformOperation),
    Arc::new(TriggerWorkflowOperation),
    Arc::new(SleepOperation),
    Arc::new(LogOperation),
  ]
}
