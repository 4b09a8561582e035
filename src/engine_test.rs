//! Tests for the traversal engine.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::engine::{FlowEngine, TriggerInvocation, env_snapshot};
use crate::error::RecorderError;
use crate::recorder::{ExecutionQuery, ExecutionRecorder, MemoryRecorder};
use crate::registry::{EngineServices, OperationRegistry};
use crate::types::{
  Connection, ConnectionSource, ConnectionType, Execution, ExecutionLogEntry, ExecutionStatus,
  Flow, FlowStatus, LogStatus, Operation,
};

fn engine_with(recorder: Arc<dyn ExecutionRecorder>) -> FlowEngine {
  FlowEngine::new(
    Arc::new(OperationRegistry::with_builtins()),
    recorder,
    Arc::new(EngineServices::detached()),
  )
}

fn active_flow(name: &str) -> Flow {
  let mut flow = Flow::new(name);
  flow.status = FlowStatus::Active;
  flow
}

#[tokio::test]
async fn linear_flow_completes_and_merges_chain() {
  let recorder = Arc::new(MemoryRecorder::new());
  let engine = engine_with(recorder.clone());

  let mut flow = active_flow("linear");
  let shape = Operation::new(
    "shape",
    "transform",
    json!({ "json": { "amount": "{{ $trigger.payload.amount }}" } }),
  );
  let note = Operation::new("note", "log", json!({ "message": "shaped {{ shape.amount }}" }));
  flow.connections = vec![
    Connection::new(ConnectionSource::Trigger, shape.id, ConnectionType::Default),
    Connection::new(
      ConnectionSource::Operation(shape.id),
      note.id,
      ConnectionType::Success,
    ),
  ];
  flow.operations = vec![shape, note];

  let execution = engine
    .run(&flow, TriggerInvocation::manual(json!({ "amount": 250 })).by("tester"))
    .await;

  assert_eq!(execution.status, ExecutionStatus::Completed);
  assert!(execution.error.is_none());
  assert_eq!(execution.chain["shape"], json!({ "amount": 250 }));
  assert_eq!(execution.chain["$last"]["message"], json!("shaped 250"));
  assert_eq!(
    execution.chain["$accountability"]["triggered_by"],
    json!("tester")
  );

  let logs = recorder.logs(execution.id).await;
  assert_eq!(logs.len(), 2);
  assert!(logs.iter().all(|e| e.status == LogStatus::Success));
  assert_eq!(logs[0].operation_key, "shape");
  assert_eq!(logs[1].operation_key, "note");
}

#[tokio::test]
async fn empty_graph_completes_with_no_logs() {
  let recorder = Arc::new(MemoryRecorder::new());
  let engine = engine_with(recorder.clone());
  let flow = active_flow("empty");

  let execution = engine.run(&flow, TriggerInvocation::manual(json!({}))).await;

  assert_eq!(execution.status, ExecutionStatus::Completed);
  assert!(recorder.logs(execution.id).await.is_empty());
  assert_eq!(execution.chain["$trigger"]["payload"], json!({}));
}

#[tokio::test]
async fn failure_without_failure_edge_fails_the_run() {
  let recorder = Arc::new(MemoryRecorder::new());
  let engine = engine_with(recorder.clone());

  let mut flow = active_flow("gate");
  let gate = Operation::new(
    "gate",
    "condition",
    json!({ "filter": { "$trigger.payload.tier": { "_eq": "gold" } } }),
  );
  let after = Operation::new("after", "log", json!({ "message": "never" }));
  flow.connections = vec![
    Connection::new(ConnectionSource::Trigger, gate.id, ConnectionType::Default),
    // Only a success edge out of the gate; a failed gate strands the run.
    Connection::new(
      ConnectionSource::Operation(gate.id),
      after.id,
      ConnectionType::Success,
    ),
  ];
  flow.operations = vec![gate, after];

  let execution = engine
    .run(&flow, TriggerInvocation::manual(json!({ "tier": "bronze" })))
    .await;

  assert_eq!(execution.status, ExecutionStatus::Failed);
  assert!(execution.error.is_some());
  assert_eq!(execution.chain["gate"]["error"], json!("condition was not met"));

  let logs = recorder.logs(execution.id).await;
  assert_eq!(logs.len(), 1);
  assert_eq!(logs[0].status, LogStatus::Failure);
}

#[tokio::test]
async fn failure_edge_continues_the_run() {
  let recorder = Arc::new(MemoryRecorder::new());
  let engine = engine_with(recorder.clone());

  let mut flow = active_flow("recover");
  let gate = Operation::new(
    "gate",
    "condition",
    json!({ "filter": { "$trigger.payload.ok": { "_eq": true } } }),
  );
  let recover = Operation::new("recover", "log", json!({ "message": "recovered" }));
  flow.connections = vec![
    Connection::new(ConnectionSource::Trigger, gate.id, ConnectionType::Default),
    Connection::new(
      ConnectionSource::Operation(gate.id),
      recover.id,
      ConnectionType::Failure,
    ),
  ];
  flow.operations = vec![gate, recover];

  let execution = engine
    .run(&flow, TriggerInvocation::manual(json!({ "ok": false })))
    .await;

  assert_eq!(execution.status, ExecutionStatus::Completed);
  assert_eq!(execution.chain["recover"]["message"], json!("recovered"));
}

#[tokio::test]
async fn success_edge_wins_over_default_edge() {
  let recorder = Arc::new(MemoryRecorder::new());
  let engine = engine_with(recorder.clone());

  let mut flow = active_flow("branch");
  let seed = Operation::new("seed", "transform", json!({ "json": { "v": 1 } }));
  let preferred = Operation::new("preferred", "log", json!({ "message": "success path" }));
  let fallback = Operation::new("fallback", "log", json!({ "message": "default path" }));
  flow.connections = vec![
    Connection::new(ConnectionSource::Trigger, seed.id, ConnectionType::Default),
    Connection::new(
      ConnectionSource::Operation(seed.id),
      fallback.id,
      ConnectionType::Default,
    )
    .with_sort_order(0),
    Connection::new(
      ConnectionSource::Operation(seed.id),
      preferred.id,
      ConnectionType::Success,
    )
    .with_sort_order(1),
  ];
  flow.operations = vec![seed, preferred, fallback];

  let execution = engine.run(&flow, TriggerInvocation::manual(json!({}))).await;

  assert_eq!(execution.status, ExecutionStatus::Completed);
  assert_eq!(execution.chain["preferred"]["message"], json!("success path"));
  assert!(execution.chain.get("fallback").is_none());
}

#[tokio::test]
async fn edge_condition_routes_against_live_chain() {
  let recorder = Arc::new(MemoryRecorder::new());
  let engine = engine_with(recorder.clone());

  let mut flow = active_flow("routed");
  let seed = Operation::new("seed", "transform", json!({ "json": { "tier": "high" } }));
  let high = Operation::new("high", "log", json!({ "message": "high tier" }));
  let low = Operation::new("low", "log", json!({ "message": "low tier" }));
  flow.connections = vec![
    Connection::new(ConnectionSource::Trigger, seed.id, ConnectionType::Default),
    Connection::new(
      ConnectionSource::Operation(seed.id),
      low.id,
      ConnectionType::Success,
    )
    .with_condition(json!({ "seed.tier": { "_eq": "low" } }))
    .with_sort_order(0),
    Connection::new(
      ConnectionSource::Operation(seed.id),
      high.id,
      ConnectionType::Success,
    )
    .with_condition(json!({ "seed.tier": { "_eq": "high" } }))
    .with_sort_order(1),
  ];
  flow.operations = vec![seed, high, low];

  let execution = engine.run(&flow, TriggerInvocation::manual(json!({}))).await;

  assert_eq!(execution.status, ExecutionStatus::Completed);
  assert_eq!(execution.chain["high"]["message"], json!("high tier"));
  assert!(execution.chain.get("low").is_none());
}

#[tokio::test]
async fn cycle_hits_the_step_ceiling() {
  let recorder = Arc::new(MemoryRecorder::new());
  let engine = engine_with(recorder.clone()).with_max_steps(5);

  let mut flow = active_flow("loop");
  let spin = Operation::new("spin", "log", json!({ "message": "again" }));
  flow.connections = vec![
    Connection::new(ConnectionSource::Trigger, spin.id, ConnectionType::Default),
    Connection::new(
      ConnectionSource::Operation(spin.id),
      spin.id,
      ConnectionType::Success,
    ),
  ];
  flow.operations = vec![spin];

  let execution = engine.run(&flow, TriggerInvocation::manual(json!({}))).await;

  assert_eq!(execution.status, ExecutionStatus::Failed);
  let error = execution.error.unwrap();
  assert!(error.contains("step limit"), "unexpected error: {error}");
  assert_eq!(recorder.logs(execution.id).await.len(), 5);
}

#[tokio::test]
async fn cancelled_token_stops_before_dispatch() {
  let recorder = Arc::new(MemoryRecorder::new());
  let engine = engine_with(recorder.clone());

  let mut flow = active_flow("cancelled");
  let step = Operation::new("step", "log", json!({ "message": "unreached" }));
  flow.connections = vec![Connection::new(
    ConnectionSource::Trigger,
    step.id,
    ConnectionType::Default,
  )];
  flow.operations = vec![step];

  let token = CancellationToken::new();
  token.cancel();
  let execution = engine
    .run(
      &flow,
      TriggerInvocation::manual(json!({})).with_cancellation(token),
    )
    .await;

  assert_eq!(execution.status, ExecutionStatus::Cancelled);
  assert!(recorder.logs(execution.id).await.is_empty());
}

#[tokio::test]
async fn unknown_operation_type_fails_the_run() {
  let recorder = Arc::new(MemoryRecorder::new());
  let engine = engine_with(recorder.clone());

  let mut flow = active_flow("bad-type");
  let odd = Operation::new("odd", "teleport", json!({}));
  flow.connections = vec![Connection::new(
    ConnectionSource::Trigger,
    odd.id,
    ConnectionType::Default,
  )];
  flow.operations = vec![odd];

  let execution = engine.run(&flow, TriggerInvocation::manual(json!({}))).await;

  assert_eq!(execution.status, ExecutionStatus::Failed);
  assert!(execution.error.unwrap().contains("teleport"));
}

#[tokio::test]
async fn cycle_revisit_keeps_first_chain_value() {
  let recorder = Arc::new(MemoryRecorder::new());
  let engine = engine_with(recorder.clone()).with_max_steps(3);

  let mut flow = active_flow("revisit");
  let stamp = Operation::new(
    "stamp",
    "transform",
    json!({ "json": { "seen": "{{ $trigger.payload.mark }}" } }),
  );
  flow.connections = vec![
    Connection::new(ConnectionSource::Trigger, stamp.id, ConnectionType::Default),
    Connection::new(
      ConnectionSource::Operation(stamp.id),
      stamp.id,
      ConnectionType::Success,
    ),
  ];
  flow.operations = vec![stamp];

  let execution = engine
    .run(&flow, TriggerInvocation::manual(json!({ "mark": "first" })))
    .await;

  // Ceiling trips, but the first write under the key survived every revisit.
  assert_eq!(execution.status, ExecutionStatus::Failed);
  assert_eq!(execution.chain["stamp"], json!({ "seen": "first" }));
}

struct BrokenRecorder;

#[async_trait]
impl ExecutionRecorder for BrokenRecorder {
  async fn begin(&self, _execution: &Execution) -> Result<(), RecorderError> {
    Err(RecorderError("storage unavailable".into()))
  }

  async fn append_log(&self, _entry: &ExecutionLogEntry) -> Result<(), RecorderError> {
    Err(RecorderError("storage unavailable".into()))
  }

  async fn update(&self, _execution: &Execution) -> Result<(), RecorderError> {
    Err(RecorderError("storage unavailable".into()))
  }

  async fn finalize(&self, _execution: &Execution) -> Result<(), RecorderError> {
    Err(RecorderError("storage unavailable".into()))
  }
}

#[tokio::test]
async fn recorder_fault_fails_without_panicking() {
  let engine = engine_with(Arc::new(BrokenRecorder));
  let flow = active_flow("unrecorded");

  let execution = engine.run(&flow, TriggerInvocation::manual(json!({}))).await;

  assert_eq!(execution.status, ExecutionStatus::Failed);
  assert!(execution.error.unwrap().contains("storage unavailable"));
}

#[test]
fn env_snapshot_only_exposes_allowed_keys() {
  // SAFETY: single-threaded test process section; no reader races here.
  unsafe {
    std::env::set_var("FLOWRUN_TEST_TOKEN", "abc123");
    std::env::set_var("FLOWRUN_TEST_SECRET", "hidden");
  }
  let snapshot = env_snapshot(["FLOWRUN_TEST_TOKEN", "FLOWRUN_TEST_ABSENT"]);
  assert_eq!(snapshot["FLOWRUN_TEST_TOKEN"], json!("abc123"));
  assert!(snapshot.get("FLOWRUN_TEST_SECRET").is_none());
  assert!(snapshot.get("FLOWRUN_TEST_ABSENT").is_none());
}
