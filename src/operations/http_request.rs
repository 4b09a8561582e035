//! Outbound HTTP call operation.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::registry::{OperationContext, OperationHandler};
use crate::types::OperationResult;

/// Default per-request timeout when the author sets none.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Performs one HTTP request with interpolated url/headers/body and surfaces
/// status code and body. Transport faults and non-success statuses map to
/// `success: false`; the engine decides whether a failure edge recovers.
pub struct HttpRequestOperation;

#[async_trait]
impl OperationHandler for HttpRequestOperation {
  fn operation_type(&self) -> &'static str {
    "http_request"
  }

  fn default_options(&self) -> Value {
    json!({ "method": "GET", "timeout_ms": DEFAULT_TIMEOUT_MS })
  }

  fn options_schema(&self) -> Value {
    json!({
      "url": { "type": "string" },
      "method": { "type": "string", "description": "GET/POST/PUT/PATCH/DELETE/HEAD/OPTIONS" },
      "headers": { "type": "object" },
      "body": { "description": "sent as JSON when an object, raw text when a string" },
      "timeout_ms": { "type": "integer" }
    })
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult {
    let Some(url) = options.get("url").and_then(Value::as_str) else {
      return OperationResult::failure("missing required option \"url\"");
    };
    let method_name = options
      .get("method")
      .and_then(Value::as_str)
      .unwrap_or("GET");
    // `Method::from_str` accepts any token as an extension method, so gate on
    // the supported set explicitly.
    let method = match method_name.to_uppercase().as_str() {
      "GET" => reqwest::Method::GET,
      "POST" => reqwest::Method::POST,
      "PUT" => reqwest::Method::PUT,
      "PATCH" => reqwest::Method::PATCH,
      "DELETE" => reqwest::Method::DELETE,
      "HEAD" => reqwest::Method::HEAD,
      "OPTIONS" => reqwest::Method::OPTIONS,
      _ => return OperationResult::failure(format!("invalid HTTP method \"{method_name}\"")),
    };
    let timeout_ms = options
      .get("timeout_ms")
      .and_then(Value::as_u64)
      .unwrap_or(DEFAULT_TIMEOUT_MS);

    let mut request = ctx
      .services
      .http
      .request(method.clone(), url)
      .timeout(Duration::from_millis(timeout_ms));
    if let Some(headers) = options.get("headers").and_then(Value::as_object) {
      for (name, value) in headers {
        if let Some(v) = value.as_str() {
          request = request.header(name, v);
        } else {
          request = request.header(name, value.to_string());
        }
      }
    }
    match options.get("body") {
      Some(Value::String(text)) => request = request.body(text.clone()),
      Some(Value::Null) | None => {}
      Some(body) => request = request.json(body),
    }

    tracing::debug!(%method, url, operation_key = %ctx.operation_key, "http_request");
    let response = match request.send().await {
      Ok(r) => r,
      Err(e) => return OperationResult::failure(e.to_string()),
    };

    let status = response.status();
    let mut headers = Map::new();
    for (name, value) in response.headers() {
      if let Ok(v) = value.to_str() {
        headers.insert(name.to_string(), Value::String(v.to_string()));
      }
    }
    let text = match response.text().await {
      Ok(t) => t,
      Err(e) => return OperationResult::failure(e.to_string()),
    };
    let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
    let data = json!({
      "status": status.as_u16(),
      "headers": headers,
      "body": body,
    });
    if status.is_success() {
      OperationResult::success(data)
    } else {
      let mut failure = OperationResult::failure(format!("HTTP {} from {url}", status.as_u16()));
      failure.data = Some(data);
      failure
    }
  }
}
