//! Tests for the condition operation.

use serde_json::json;

use super::ConditionOperation;
use super::test_support::context;
use crate::registry::OperationHandler;

#[tokio::test]
async fn matching_filter_succeeds() {
  let ctx = context(json!({"$trigger": {"payload": {"amount": 150}}}));
  let options = json!({"filter": {"$trigger.payload.amount": {"_gt": 100}}});
  let result = ConditionOperation.execute(options, &ctx).await;
  assert!(result.success);
  assert_eq!(result.data, Some(json!({"matched": true})));
}

#[tokio::test]
async fn non_matching_filter_fails_without_side_effects() {
  let ctx = context(json!({"$trigger": {"payload": {"amount": 50}}}));
  let options = json!({"filter": {"$trigger.payload.amount": {"_gt": 100}}});
  let result = ConditionOperation.execute(options, &ctx).await;
  assert!(!result.success);
  assert_eq!(result.error.as_deref(), Some("condition was not met"));
}

#[tokio::test]
async fn missing_filter_matches_everything() {
  let ctx = context(json!({}));
  let result = ConditionOperation.execute(json!({}), &ctx).await;
  assert!(result.success);
}
