//! Dot/bracket path resolution over nested JSON values.
//!
//! Leaf dependency of the filter evaluator, the interpolator and the engine:
//! everything that addresses the data chain goes through [get] / [set].

use serde_json::{Map, Value};

/// One parsed path segment: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
  Key(String),
  Index(usize),
}

/// Splits a path on `.` and `[idx]`, so `items[0].name` yields
/// `Key(items), Index(0), Key(name)`. Empty segments are skipped.
pub(crate) fn parse_path(path: &str) -> Vec<Segment> {
  let mut segments = Vec::new();
  for part in path.split('.') {
    let mut rest = part;
    while let Some(open) = rest.find('[') {
      let head = &rest[..open];
      if !head.is_empty() {
        segments.push(Segment::Key(head.to_string()));
      }
      match rest[open + 1..].find(']') {
        Some(close) => {
          let idx = &rest[open + 1..open + 1 + close];
          match idx.parse::<usize>() {
            Ok(i) => segments.push(Segment::Index(i)),
            Err(_) => segments.push(Segment::Key(idx.to_string())),
          }
          rest = &rest[open + close + 2..];
        }
        None => {
          // Unbalanced bracket: treat the remainder as a literal key.
          segments.push(Segment::Key(rest[open..].to_string()));
          rest = "";
        }
      }
    }
    if !rest.is_empty() {
      segments.push(Segment::Key(rest.to_string()));
    }
  }
  segments
}

/// Resolves `path` against `data`, returning `None` the instant any
/// intermediate segment is missing or the current value is null. Never panics.
pub fn get<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
  let mut current = data;
  for segment in parse_path(path) {
    if current.is_null() {
      return None;
    }
    current = match segment {
      Segment::Key(k) => current.as_object()?.get(&k)?,
      Segment::Index(i) => current.as_array()?.get(i)?,
    };
  }
  Some(current)
}

/// Assigns `value` at `path` in `data`, splitting on `.` only and creating
/// intermediate objects as needed. A non-object intermediate is replaced.
pub fn set(data: &mut Value, path: &str, value: Value) {
  let keys: Vec<&str> = path.split('.').filter(|k| !k.is_empty()).collect();
  if keys.is_empty() {
    return;
  }
  let mut current = data;
  for key in &keys[..keys.len() - 1] {
    if !current.is_object() {
      *current = Value::Object(Map::new());
    }
    match current {
      Value::Object(map) => {
        current = map
          .entry(key.to_string())
          .or_insert_with(|| Value::Object(Map::new()));
      }
      _ => return,
    }
  }
  if !current.is_object() {
    *current = Value::Object(Map::new());
  }
  if let Value::Object(map) = current {
    map.insert(keys[keys.len() - 1].to_string(), value);
  }
}
