//! `{{ path }}` placeholder expansion against the data chain.
//!
//! Two entry points: [interpolate_string] for plain string templates and
//! [interpolate_value] for whole option trees. A string that is exactly one
//! placeholder resolves with its native type preserved; everywhere else the
//! resolved value is stringified (JSON for objects, empty string for
//! missing/null). Interpolation never fails — operations validate their
//! required inputs after it runs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::path;

/// Matches every `{{ expr }}` occurrence in a template.
static PLACEHOLDER: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("placeholder regex"));

/// Matches a string that is exactly one placeholder.
static EXACT_PLACEHOLDER: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^\{\{\s*([^{}]+?)\s*\}\}$").expect("exact placeholder regex"));

/// Replaces every `{{ expr }}` in `template` with the stringified resolved
/// value; unresolved paths become the empty string.
pub fn interpolate_string(template: &str, chain: &Value) -> String {
  PLACEHOLDER
    .replace_all(template, |caps: &regex::Captures| {
      path::get(chain, &caps[1]).map(stringify).unwrap_or_default()
    })
    .into_owned()
}

/// Recursively interpolates `value` against `chain`. Exact-placeholder
/// strings keep the native type of the resolved value (Null when missing);
/// arrays and objects recurse per element; other scalars pass through.
pub fn interpolate_value(value: &Value, chain: &Value) -> Value {
  match value {
    Value::String(s) => match EXACT_PLACEHOLDER.captures(s) {
      Some(caps) => path::get(chain, &caps[1]).cloned().unwrap_or(Value::Null),
      None => Value::String(interpolate_string(s, chain)),
    },
    Value::Array(items) => Value::Array(items.iter().map(|v| interpolate_value(v, chain)).collect()),
    Value::Object(entries) => Value::Object(
      entries
        .iter()
        .map(|(k, v)| (k.clone(), interpolate_value(v, chain)))
        .collect(),
    ),
    scalar => scalar.clone(),
  }
}

/// Renders a resolved value for embedding in a string: bare strings stay
/// unquoted, null renders empty, everything else is JSON.
fn stringify(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}
