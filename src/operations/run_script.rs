//! Run-script operation: a constrained Lua snippet over the chain.

use async_trait::async_trait;
use mlua::{Lua, LuaOptions, LuaSerdeExt, StdLib};
use serde_json::{Value, json};

use crate::registry::{OperationContext, OperationHandler};
use crate::types::OperationResult;

/// Evaluates `options.script` in a Lua state restricted to the math, string
/// and table libraries — no filesystem, process or network access. The data
/// chain is exposed as the `chain` global; the evaluated value becomes the
/// result data.
pub struct RunScriptOperation;

impl RunScriptOperation {
  fn eval(script: &str, chain: &Value) -> Result<Value, mlua::Error> {
    let lua = Lua::new_with(
      StdLib::MATH | StdLib::STRING | StdLib::TABLE,
      LuaOptions::default(),
    )?;
    lua.globals().set("chain", lua.to_value(chain)?)?;
    let evaluated: mlua::Value = lua.load(script).eval()?;
    lua.from_value(evaluated)
  }
}

#[async_trait]
impl OperationHandler for RunScriptOperation {
  fn operation_type(&self) -> &'static str {
    "run_script"
  }

  fn default_options(&self) -> Value {
    json!({ "script": "return nil" })
  }

  fn options_schema(&self) -> Value {
    json!({
      "script": {
        "type": "string",
        "description": "Lua snippet; reads the data chain via the `chain` global"
      }
    })
  }

  async fn execute(&self, options: Value, ctx: &OperationContext) -> OperationResult {
    let Some(script) = options.get("script").and_then(Value::as_str) else {
      return OperationResult::failure("missing required option \"script\"");
    };
    tracing::debug!(operation_key = %ctx.operation_key, "run_script");
    match Self::eval(script, &ctx.chain) {
      Ok(value) => OperationResult::success(value),
      Err(e) => OperationResult::failure_with_stack("script error", e.to_string()),
    }
  }
}
