//! Dispatcher: resolves `<module>:<action>` and normalizes the outcome.
//!
//! Two tiers of failure leave this module:
//! - `Err(Error)` for caller contract violations (malformed name, unknown
//!   module or action, arguments that violate the input schema);
//! - `Ok(ToolResult { is_error: true, .. })` for everything that went wrong
//!   after the call was accepted, including panics inside the module.

use crate::tools::manifest::ManifestError;
use crate::tools::module::{ModuleError, ToolResult};
use crate::tools::registry::ModuleRegistry;
use crate::types::{Error, QualifiedName, Result};
use futures::FutureExt;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

/// Dispatch one tool call against the registry.
pub async fn dispatch(
    registry: &ModuleRegistry,
    name: &str,
    arguments: Option<Value>,
) -> Result<ToolResult> {
    let qualified = QualifiedName::parse(name)?;

    let unknown_module =
        || Error::method_not_found(format!("unknown module: {}", qualified.module));
    let module = registry.resolve(qualified.module).ok_or_else(unknown_module)?;
    let manifest = match registry.manifest(qualified.module).ok_or_else(unknown_module)? {
        Ok(m) => m,
        Err(ManifestError::Module(e)) => {
            tracing::warn!(tool = %name, error = %e, "Module manifest unavailable");
            return Ok(ToolResult::failure(format!("Error: {}", e)));
        }
        Err(e) => return Err(Error::internal(e.to_string())),
    };
    let action = manifest.action(qualified.action).ok_or_else(|| {
        Error::method_not_found(format!(
            "unknown action '{}' in module '{}'",
            qualified.action, qualified.module
        ))
    })?;

    let arguments = normalize_arguments(arguments)?;
    let violations = action.violations(&arguments);
    if !violations.is_empty() {
        return Err(Error::invalid_params(format!(
            "invalid arguments: {}",
            violations.join("; ")
        )));
    }

    let start = Instant::now();
    let outcome = AssertUnwindSafe(module.invoke(qualified.action, arguments))
        .catch_unwind()
        .await;
    let elapsed_ms = start.elapsed().as_millis();

    match outcome {
        Ok(Ok(result)) => {
            tracing::info!(tool = %name, elapsed_ms = %elapsed_ms, is_error = result.is_error, "Tool call completed");
            Ok(result)
        }
        Ok(Err(ModuleError::UnknownAction(action))) => Err(Error::method_not_found(format!(
            "unknown action '{}' in module '{}'",
            action, qualified.module
        ))),
        Ok(Err(ModuleError::InvalidArguments(msg))) => Err(Error::invalid_params(format!(
            "invalid arguments for {}: {}",
            name, msg
        ))),
        Ok(Err(e)) => {
            tracing::warn!(tool = %name, elapsed_ms = %elapsed_ms, error = %e, "Tool call failed");
            Ok(ToolResult::failure(format!("Error: {}", e)))
        }
        Err(panic) => {
            let msg = panic_message(panic.as_ref());
            tracing::error!(tool = %name, elapsed_ms = %elapsed_ms, panic = %msg, "Tool call panicked");
            Ok(ToolResult::failure(format!("Error: {}", msg)))
        }
    }
}

/// Absent or null arguments mean `{}`; anything else must be an object.
fn normalize_arguments(arguments: Option<Value>) -> Result<Value> {
    match arguments {
        None | Some(Value::Null) => Ok(Value::Object(Map::new())),
        Some(v @ Value::Object(_)) => Ok(v),
        Some(other) => Err(Error::invalid_params(format!(
            "arguments must be a JSON object, got {}",
            value_type_name(&other)
        ))),
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
