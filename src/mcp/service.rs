//! The two MCP operations every front end serves.

use crate::tools::{aggregate, build_catalog, dispatch, HealthReport, ModuleRegistry, ToolDescriptor, ToolResult};
use crate::types::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// "List tools" and "call tool", independent of how requests arrive.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;

    async fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<ToolResult>;
}

/// In-process gateway over the module registry.
#[derive(Debug, Clone)]
pub struct LocalGateway {
    registry: Arc<ModuleRegistry>,
    probe_timeout: Duration,
}

impl LocalGateway {
    pub fn new(registry: Arc<ModuleRegistry>, probe_timeout: Duration) -> Self {
        Self {
            registry,
            probe_timeout,
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub async fn health(&self) -> HealthReport {
        aggregate(&self.registry, self.probe_timeout).await
    }
}

#[async_trait]
impl Gateway for LocalGateway {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        build_catalog(&self.registry)
    }

    async fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<ToolResult> {
        dispatch(&self.registry, name, arguments).await
    }
}
