//! Graph traversal engine: runs one flow execution to a terminal state.
//!
//! One run is a single logical thread of control — operations execute
//! strictly sequentially because later options may interpolate earlier
//! results. Concurrent runs share nothing mutable: the flow definition is
//! read-only during execution and callers hand the engine a cloned flow
//! (copy-on-start). The engine never throws out of a run; every path resolves
//! to a terminal execution status plus a complete log.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::error::EngineFault;
use crate::filter;
use crate::interpolate;
use crate::recorder::ExecutionRecorder;
use crate::registry::{
  EngineServices, OperationContext, OperationRegistry, merge_options,
};
use crate::types::{
  Connection, ConnectionSource, ConnectionType, DataChain, Execution, ExecutionLogEntry,
  ExecutionStatus, Flow,
};

/// Default ceiling on operations per run; an authored cycle without a
/// terminating condition hits this instead of looping forever.
pub const DEFAULT_MAX_STEPS: u32 = 1000;

/// The input that starts a run.
pub struct TriggerInvocation {
  pub payload: Value,
  pub triggered_by: Option<String>,
  /// Cooperative cancellation, checked before each dispatch. An operation
  /// already in flight finishes (or times out per its own policy).
  pub cancellation: CancellationToken,
}

impl TriggerInvocation {
  pub fn manual(payload: Value) -> Self {
    Self {
      payload,
      triggered_by: None,
      cancellation: CancellationToken::new(),
    }
  }

  pub fn by(mut self, triggered_by: impl Into<String>) -> Self {
    self.triggered_by = Some(triggered_by.into());
    self
  }

  pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
    self.cancellation = token;
    self
  }
}

/// Snapshot of process environment values filtered by an allow-list, for
/// injection as the chain's `$env`. Keeping this injected rather than global
/// makes runs reproducible.
pub fn env_snapshot<I, S>(allow_list: I) -> Value
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut entries = Map::new();
  for key in allow_list {
    if let Ok(value) = std::env::var(key.as_ref()) {
      entries.insert(key.as_ref().to_string(), Value::String(value));
    }
  }
  Value::Object(entries)
}

/// Selects the next connection out of `source`. Candidates arrive sorted by
/// sort_order then id; the first match wins the tie-break. A condition (if
/// present) must pass against the live chain. After a success (the trigger
/// counts as one) success-typed edges win, with default edges as fallback;
/// after a failure only failure-typed edges continue the run.
pub(crate) fn select_connection<'a>(
  flow: &'a Flow,
  source: ConnectionSource,
  last_success: bool,
  chain: &Value,
) -> Option<&'a Connection> {
  let qualifying: Vec<&Connection> = flow
    .outgoing_connections(source)
    .into_iter()
    .filter(|c| {
      c.condition
        .as_ref()
        .map(|cond| filter::evaluate(cond, chain))
        .unwrap_or(true)
    })
    .collect();
  if last_success {
    qualifying
      .iter()
      .find(|c| c.connection_type == ConnectionType::Success)
      .or_else(|| {
        qualifying
          .iter()
          .find(|c| c.connection_type == ConnectionType::Default)
      })
      .copied()
  } else {
    qualifying
      .iter()
      .find(|c| c.connection_type == ConnectionType::Failure)
      .copied()
  }
}

/// Executes flows against a registry, a recorder and the collaborator bundle.
pub struct FlowEngine {
  registry: Arc<OperationRegistry>,
  recorder: Arc<dyn ExecutionRecorder>,
  services: Arc<EngineServices>,
  env: Value,
  max_steps: u32,
}

impl FlowEngine {
  pub fn new(
    registry: Arc<OperationRegistry>,
    recorder: Arc<dyn ExecutionRecorder>,
    services: Arc<EngineServices>,
  ) -> Self {
    Self {
      registry,
      recorder,
      services,
      env: Value::Object(Map::new()),
      max_steps: DEFAULT_MAX_STEPS,
    }
  }

  /// Injects the `$env` snapshot seeded into every chain.
  pub fn with_env(mut self, env: Value) -> Self {
    self.env = env;
    self
  }

  pub fn with_max_steps(mut self, max_steps: u32) -> Self {
    self.max_steps = max_steps;
    self
  }

  /// Runs `flow` to a terminal state. Infallible by contract: recorder
  /// faults, unknown types and step-limit breaches all land in the returned
  /// execution record, never in a panic or error.
  #[instrument(level = "trace", skip(self, flow, trigger), fields(flow_id = %flow.id))]
  pub async fn run(&self, flow: &Flow, trigger: TriggerInvocation) -> Execution {
    let mut execution = Execution::pending(flow.id, trigger.triggered_by.clone());
    let mut chain = DataChain::seed(
      trigger.payload,
      trigger.triggered_by.as_deref(),
      self.env.clone(),
    );
    execution.status = ExecutionStatus::Running;
    execution.chain = chain.snapshot();
    info!(execution_id = %execution.id, flow = %flow.name, "execution started");

    if let Err(e) = self.recorder.begin(&execution).await {
      return self.abort(execution, EngineFault::Recorder(e.to_string())).await;
    }

    let mut source = ConnectionSource::Trigger;
    let mut last_success = true;
    let mut last_error: Option<String> = None;
    let mut steps: u32 = 0;

    loop {
      if trigger.cancellation.is_cancelled() {
        info!(execution_id = %execution.id, "execution cancelled");
        execution.finish(ExecutionStatus::Cancelled, None);
        break;
      }

      let Some(connection) = select_connection(flow, source, last_success, chain.root()) else {
        // The graph drained. Normal completion after a success; a failure
        // with no failure edge is fatal to the run.
        if last_success {
          execution.finish(ExecutionStatus::Completed, None);
        } else {
          execution.finish(ExecutionStatus::Failed, last_error.clone());
        }
        break;
      };

      steps += 1;
      if steps > self.max_steps {
        let fault = EngineFault::StepLimitExceeded {
          limit: self.max_steps,
        };
        warn!(execution_id = %execution.id, %fault, "run aborted");
        execution.finish(ExecutionStatus::Failed, Some(fault.to_string()));
        break;
      }

      let Some(operation) = flow.operation(connection.target_id) else {
        execution.finish(
          ExecutionStatus::Failed,
          Some(format!(
            "connection {} targets missing operation {}",
            connection.id, connection.target_id
          )),
        );
        break;
      };
      let Some(handler) = self.registry.get(&operation.operation_type) else {
        execution.finish(
          ExecutionStatus::Failed,
          Some(format!(
            "unknown operation type \"{}\" (operation \"{}\")",
            operation.operation_type, operation.key
          )),
        );
        break;
      };

      let merged = merge_options(handler.default_options(), &operation.options);
      let resolved = interpolate::interpolate_value(&merged, chain.root());
      let entry = ExecutionLogEntry::begin(
        execution.id,
        Some(operation.id),
        &operation.key,
        resolved.clone(),
      );
      if let Err(e) = self.recorder.append_log(&entry).await {
        return self.abort(execution, EngineFault::Recorder(e.to_string())).await;
      }

      info!(
        execution_id = %execution.id,
        operation_key = %operation.key,
        operation_type = %operation.operation_type,
        step = steps,
        "executing operation"
      );
      let ctx = OperationContext {
        execution_id: execution.id,
        operation_key: operation.key.clone(),
        chain: chain.snapshot(),
        services: self.services.clone(),
        cancellation: trigger.cancellation.clone(),
      };
      let started = Instant::now();
      let result = handler.execute(resolved, &ctx).await;
      let duration_ms = started.elapsed().as_millis() as u64;

      if let Err(e) = self
        .recorder
        .append_log(&entry.finalized(&result, duration_ms))
        .await
      {
        return self.abort(execution, EngineFault::Recorder(e.to_string())).await;
      }

      // Merge under the operation key and the $last alias. A revisited key
      // (authored cycle) keeps its first value; only $last moves.
      let merged_value = result.chain_value();
      let _ = chain.insert(&operation.key, merged_value.clone());
      chain.set_last(merged_value);
      execution.chain = chain.snapshot();
      if let Err(e) = self.recorder.update(&execution).await {
        return self.abort(execution, EngineFault::Recorder(e.to_string())).await;
      }

      last_success = result.success;
      last_error = result.error.clone();
      source = ConnectionSource::Operation(operation.id);
    }

    if let Err(e) = self.recorder.finalize(&execution).await {
      warn!(execution_id = %execution.id, error = %e, "failed to finalize execution record");
    }
    info!(
      execution_id = %execution.id,
      status = %execution.status,
      steps,
      "execution finished"
    );
    execution
  }

  /// Terminal path for infrastructure faults: mark failed, best-effort
  /// finalize, hand the record back.
  async fn abort(&self, mut execution: Execution, fault: EngineFault) -> Execution {
    warn!(execution_id = %execution.id, %fault, "engine fault");
    execution.finish(ExecutionStatus::Failed, Some(fault.to_string()));
    if let Err(e) = self.recorder.finalize(&execution).await {
      warn!(execution_id = %execution.id, error = %e, "failed to finalize after fault");
    }
    execution
  }
}
