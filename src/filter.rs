//! Declarative boolean predicate engine over JSON data.
//!
//! A filter rule is a mapping from field paths (or logical keys) to either a
//! literal value (implying `_eq`) or a mapping of comparison operators.
//! Evaluation is pure and synchronous and never panics; connection conditions
//! and the `condition` operation both go through [evaluate].

use serde_json::Value;
use std::cmp::Ordering;

use crate::path;

/// Evaluates a filter rule against `data`. A non-object rule matches
/// everything; logical keys `_and` / `_or` / `_not` compose sub-rules.
pub fn evaluate(rule: &Value, data: &Value) -> bool {
  let Some(entries) = rule.as_object() else {
    return true;
  };
  entries.iter().all(|(key, expected)| match key.as_str() {
    "_and" => expected
      .as_array()
      .map(|subs| subs.iter().all(|sub| evaluate(sub, data)))
      .unwrap_or(true),
    "_or" => expected
      .as_array()
      .map(|subs| subs.iter().any(|sub| evaluate(sub, data)))
      .unwrap_or(true),
    "_not" => !evaluate(expected, data),
    _ => evaluate_field(key, expected, data),
  })
}

/// Evaluates a single field entry: an operator mapping applies each operator
/// to the resolved value; anything else is an implicit equality check.
fn evaluate_field(field_path: &str, expected: &Value, data: &Value) -> bool {
  let actual = path::get(data, field_path);
  match expected.as_object() {
    Some(ops) if ops.keys().any(|k| k.starts_with('_')) => ops
      .iter()
      .all(|(op, operand)| apply_operator(op, actual, operand)),
    _ => values_equal(actual, expected),
  }
}

/// Applies one comparison operator. An unrecognized operator is vacuously
/// true; callers that want strict validation must reject rules at authoring
/// time.
fn apply_operator(op: &str, actual: Option<&Value>, operand: &Value) -> bool {
  match op {
    "_eq" => values_equal(actual, operand),
    "_neq" => !values_equal(actual, operand),
    "_gt" => compare(actual, operand) == Some(Ordering::Greater),
    "_gte" => matches!(
      compare(actual, operand),
      Some(Ordering::Greater) | Some(Ordering::Equal)
    ),
    "_lt" => compare(actual, operand) == Some(Ordering::Less),
    "_lte" => matches!(
      compare(actual, operand),
      Some(Ordering::Less) | Some(Ordering::Equal)
    ),
    "_in" => operand
      .as_array()
      .map(|candidates| candidates.iter().any(|c| values_equal(actual, c)))
      .unwrap_or(false),
    "_nin" => !operand
      .as_array()
      .map(|candidates| candidates.iter().any(|c| values_equal(actual, c)))
      .unwrap_or(false),
    "_contains" => match actual {
      Some(Value::String(s)) => operand.as_str().map(|sub| s.contains(sub)).unwrap_or(false),
      Some(Value::Array(items)) => items.iter().any(|item| item == operand),
      _ => false,
    },
    "_starts_with" => matches!(
      (actual, operand.as_str()),
      (Some(Value::String(s)), Some(prefix)) if s.starts_with(prefix)
    ),
    "_ends_with" => matches!(
      (actual, operand.as_str()),
      (Some(Value::String(s)), Some(suffix)) if s.ends_with(suffix)
    ),
    "_null" => {
      let is_null = actual.is_none_or(Value::is_null);
      operand.as_bool().map(|b| b == is_null).unwrap_or(true)
    }
    "_empty" => {
      let is_empty = match actual {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
      };
      operand.as_bool().map(|b| b == is_empty).unwrap_or(true)
    }
    _ => true,
  }
}

/// Loose equality: a missing value equals null, numbers compare numerically,
/// numeric strings compare against numbers.
fn values_equal(actual: Option<&Value>, expected: &Value) -> bool {
  let actual = actual.unwrap_or(&Value::Null);
  if actual == expected {
    return true;
  }
  matches!(compare(Some(actual), expected), Some(Ordering::Equal))
}

/// Orders the resolved value against an operand: numerically when both sides
/// coerce to numbers (numeric strings included), lexically when both are
/// strings. Incomparable values yield `None`.
fn compare(actual: Option<&Value>, operand: &Value) -> Option<Ordering> {
  let actual = actual?;
  if let (Some(a), Some(b)) = (as_number(actual), as_number(operand)) {
    return a.partial_cmp(&b);
  }
  match (actual, operand) {
    (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
    _ => None,
  }
}

/// Coerces a JSON value to f64: numbers directly, strings via parse.
fn as_number(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  }
}
