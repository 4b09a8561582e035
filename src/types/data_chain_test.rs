//! Tests for `DataChain`.

use serde_json::json;

use super::{ChainError, DataChain};

#[test]
fn seed_populates_reserved_keys() {
  let chain = DataChain::seed(json!({"amount": 5}), Some("admin"), json!({"REGION": "eu"}));
  assert_eq!(chain.get("$trigger.payload.amount"), Some(&json!(5)));
  assert!(chain.get("$trigger.timestamp").is_some());
  assert_eq!(
    chain.get("$accountability.triggered_by"),
    Some(&json!("admin"))
  );
  assert_eq!(chain.get("$env.REGION"), Some(&json!("eu")));
  assert_eq!(chain.get("$last"), Some(&json!(null)));
}

#[test]
fn seed_without_accountability_is_null() {
  let chain = DataChain::seed(json!(null), None, json!({}));
  assert_eq!(
    chain.get("$accountability.triggered_by"),
    Some(&json!(null))
  );
}

#[test]
fn insert_appends_operation_result() {
  let mut chain = DataChain::seed(json!({}), None, json!({}));
  chain.insert("step_one", json!({"tier": "high"})).unwrap();
  assert_eq!(chain.get("step_one.tier"), Some(&json!("high")));
}

#[test]
fn insert_rejects_duplicate_key() {
  let mut chain = DataChain::seed(json!({}), None, json!({}));
  chain.insert("op", json!(1)).unwrap();
  assert_eq!(
    chain.insert("op", json!(2)),
    Err(ChainError::DuplicateKey("op".to_string()))
  );
  // First write wins.
  assert_eq!(chain.get("op"), Some(&json!(1)));
}

#[test]
fn insert_rejects_reserved_keys() {
  let mut chain = DataChain::seed(json!({}), None, json!({}));
  for key in ["$trigger", "$accountability", "$env", "$last", "$anything"] {
    assert_eq!(
      chain.insert(key, json!(1)),
      Err(ChainError::ReservedKey(key.to_string()))
    );
  }
}

#[test]
fn set_last_overwrites_alias_only() {
  let mut chain = DataChain::seed(json!({}), None, json!({}));
  chain.insert("first", json!("a")).unwrap();
  chain.set_last(json!("a"));
  chain.set_last(json!("b"));
  assert_eq!(chain.get("$last"), Some(&json!("b")));
  assert_eq!(chain.get("first"), Some(&json!("a")));
}

#[test]
fn snapshot_round_trips_through_serde() {
  let mut chain = DataChain::seed(json!({"n": 1}), Some("svc"), json!({}));
  chain.insert("op", json!({"ok": true})).unwrap();
  let json = serde_json::to_string(&chain).unwrap();
  let back: DataChain = serde_json::from_str(&json).unwrap();
  assert_eq!(back.snapshot(), chain.snapshot());
  assert!(back.contains_key("op"));
}
