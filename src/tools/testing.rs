//! In-crate test modules.

use crate::tools::module::{ActionDescriptor, HealthStatus, ModuleError, ToolModule, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Deserialize, JsonSchema)]
pub struct NoArgs {}

#[derive(Deserialize, JsonSchema)]
pub struct EchoArgs {
    /// Text to send back
    pub text: String,
}

/// `ping` → `pong`, `echo` → its text, `boom` fails with "x", `panic` panics.
#[derive(Debug, Clone, Copy)]
pub struct EchoModule;

#[async_trait]
impl ToolModule for EchoModule {
    fn list_descriptors(&self) -> Result<Vec<ActionDescriptor>, ModuleError> {
        Ok(vec![
            ActionDescriptor::for_args::<NoArgs>("ping", "Reply with pong"),
            ActionDescriptor::for_args::<EchoArgs>("echo", "Reply with the given text"),
            ActionDescriptor::for_args::<NoArgs>("boom", "Always fails"),
            ActionDescriptor::for_args::<NoArgs>("panic", "Always panics"),
        ])
    }

    async fn invoke(&self, action: &str, arguments: Value) -> Result<ToolResult, ModuleError> {
        match action {
            "ping" => Ok(ToolResult::success("pong")),
            "echo" => {
                let args: EchoArgs = serde_json::from_value(arguments)
                    .map_err(|e| ModuleError::InvalidArguments(e.to_string()))?;
                Ok(ToolResult::success(args.text))
            }
            "boom" => Err(ModuleError::failed("x")),
            "panic" => panic!("module exploded"),
            other => Err(ModuleError::UnknownAction(other.to_string())),
        }
    }

    async fn probe_health(&self) -> Result<HealthStatus, ModuleError> {
        Ok(HealthStatus::healthy("echo ok"))
    }
}

/// Lists tools it cannot run and whose probe errors out.
#[derive(Debug, Clone, Copy)]
pub struct BrokenModule;

#[async_trait]
impl ToolModule for BrokenModule {
    fn list_descriptors(&self) -> Result<Vec<ActionDescriptor>, ModuleError> {
        Err(ModuleError::failed("manifest unavailable"))
    }

    async fn invoke(&self, action: &str, _arguments: Value) -> Result<ToolResult, ModuleError> {
        Err(ModuleError::UnknownAction(action.to_string()))
    }

    async fn probe_health(&self) -> Result<HealthStatus, ModuleError> {
        Err(ModuleError::failed("probe crashed"))
    }
}

/// Declares `ghost` in its manifest but does not implement it.
#[derive(Debug, Clone, Copy)]
pub struct DriftingModule;

#[async_trait]
impl ToolModule for DriftingModule {
    fn list_descriptors(&self) -> Result<Vec<ActionDescriptor>, ModuleError> {
        Ok(vec![ActionDescriptor::for_args::<NoArgs>("ghost", "Declared, not implemented")])
    }

    async fn invoke(&self, action: &str, _arguments: Value) -> Result<ToolResult, ModuleError> {
        Err(ModuleError::UnknownAction(action.to_string()))
    }

    async fn probe_health(&self) -> Result<HealthStatus, ModuleError> {
        Ok(HealthStatus::unhealthy("backend refused connection"))
    }
}

/// Probe never finishes within any reasonable budget.
#[derive(Debug, Clone, Copy)]
pub struct StalledModule;

#[async_trait]
impl ToolModule for StalledModule {
    fn list_descriptors(&self) -> Result<Vec<ActionDescriptor>, ModuleError> {
        Ok(Vec::new())
    }

    async fn invoke(&self, action: &str, _arguments: Value) -> Result<ToolResult, ModuleError> {
        Err(ModuleError::UnknownAction(action.to_string()))
    }

    async fn probe_health(&self) -> Result<HealthStatus, ModuleError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(HealthStatus::healthy("late"))
    }
}

/// Counts manifest requests; `ping` → `pong`.
#[derive(Debug, Clone, Default)]
pub struct CountingModule {
    pub manifest_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ToolModule for CountingModule {
    fn list_descriptors(&self) -> Result<Vec<ActionDescriptor>, ModuleError> {
        self.manifest_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![ActionDescriptor::for_args::<EchoArgs>("echo", "Reply with the given text")])
    }

    async fn invoke(&self, action: &str, arguments: Value) -> Result<ToolResult, ModuleError> {
        match action {
            "echo" => Ok(ToolResult::success(arguments["text"].as_str().unwrap_or_default())),
            other => Err(ModuleError::UnknownAction(other.to_string())),
        }
    }

    async fn probe_health(&self) -> Result<HealthStatus, ModuleError> {
        Ok(HealthStatus::healthy("counting ok"))
    }
}
