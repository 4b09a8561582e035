//! Flow engine data model: flows, operations, connections, executions and the
//! data chain that accumulates per-run results.

mod connection;
mod data_chain;
#[cfg(test)]
mod data_chain_test;
mod execution;
mod execution_log;
#[cfg(test)]
mod execution_log_test;
mod flow;
mod operation;
mod operation_result;

pub use connection::{Connection, ConnectionSource, ConnectionType};
pub use data_chain::{ACCOUNTABILITY_KEY, ChainError, DataChain, ENV_KEY, LAST_KEY, TRIGGER_KEY};
pub use execution::{Execution, ExecutionStatus};
pub use execution_log::{ExecutionLogEntry, LogStatus};
pub use flow::{Flow, FlowStatus, FlowTrigger, TriggerType};
pub use operation::Operation;
pub use operation_result::OperationResult;
