//! Tests for `ExecutionLogEntry`.

use serde_json::json;
use uuid::Uuid;

use super::{ExecutionLogEntry, LogStatus, OperationResult};

#[test]
fn begin_entry_is_running() {
  let entry = ExecutionLogEntry::begin(Uuid::new_v4(), None, "step", json!({"a": 1}));
  assert_eq!(entry.status, LogStatus::Running);
  assert_eq!(entry.input_data, json!({"a": 1}));
  assert!(entry.output_data.is_none());
  assert!(entry.duration_ms.is_none());
}

#[test]
fn finalized_success_keeps_id_and_input() {
  let entry = ExecutionLogEntry::begin(Uuid::new_v4(), None, "step", json!({"a": 1}));
  let done = entry.finalized(&OperationResult::success(json!({"ok": true})), 12);
  assert_eq!(done.id, entry.id);
  assert_eq!(done.status, LogStatus::Success);
  assert_eq!(done.input_data, json!({"a": 1}));
  assert_eq!(done.output_data, Some(json!({"ok": true})));
  assert_eq!(done.duration_ms, Some(12));
}

#[test]
fn finalized_failure_carries_error() {
  let entry = ExecutionLogEntry::begin(Uuid::new_v4(), None, "step", json!({}));
  let done = entry.finalized(&OperationResult::failure_with_stack("boom", "trace"), 3);
  assert_eq!(done.status, LogStatus::Failure);
  assert_eq!(done.error.as_deref(), Some("boom"));
  assert_eq!(done.error_stack.as_deref(), Some("trace"));
}

#[test]
fn entry_serializes_to_json() {
  let entry = ExecutionLogEntry::begin(Uuid::new_v4(), Some(Uuid::new_v4()), "step", json!({}));
  let parsed: serde_json::Value =
    serde_json::from_str(&serde_json::to_string(&entry).unwrap()).unwrap();
  assert_eq!(parsed["status"], "running");
  assert_eq!(parsed["operation_key"], "step");
}
