//! # flowrun
//!
//! Embeddable automation engine: flows are directed graphs of operations
//! wired by outcome-typed connections, executed one trigger at a time
//! against a growing JSON data chain.
//!
//! ## Architecture
//!
//! Authoring goes through [service::FlowService], which validates and stores
//! definitions. Execution goes through [engine::FlowEngine]: it walks the
//! graph edge by edge, dispatches each operation via the
//! [registry::OperationRegistry], merges results into the chain and records
//! an audit trail through a [recorder::ExecutionRecorder]. Operation options
//! support `{{ path }}` interpolation against the chain, and connections may
//! carry declarative filter conditions (see `filter` module).

pub mod engine;
#[cfg(test)]
mod engine_test;
pub mod error;
pub mod filter;
pub mod interpolate;
pub mod modules;
pub mod operations;
pub mod path;
pub mod recorder;
pub mod registry;
pub mod service;
pub mod store;
pub mod types;

pub use engine::{FlowEngine, TriggerInvocation};
pub use recorder::{ExecutionQuery, ExecutionRecorder, MemoryRecorder, Pagination};
pub use registry::{EngineServices, OperationContext, OperationHandler, OperationRegistry};
pub use service::FlowService;
pub use store::{FlowStore, MemoryFlowStore};
pub use types::{
  Connection, ConnectionSource, ConnectionType, DataChain, Execution, ExecutionLogEntry,
  ExecutionStatus, Flow, FlowStatus, LogStatus, Operation, OperationResult, TriggerType,
};
