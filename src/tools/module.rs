//! Tool module contract and the value types that cross it.

use crate::backend::BackendError;
use async_trait::async_trait;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// =============================================================================
// Descriptors
// =============================================================================

/// A module-local action, before namespacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ActionDescriptor {
    /// Describe an action whose arguments deserialize into `A`.
    pub fn for_args<A: JsonSchema>(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: input_schema::<A>(),
        }
    }
}

/// A catalog entry as the caller sees it: `name` is `<module>:<action>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Generate an inline JSON Schema object for an argument struct.
pub fn input_schema<A: JsonSchema>() -> Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<A>();
    let mut schema = serde_json::to_value(root).unwrap_or_else(|_| empty_object_schema());
    if let Some(map) = schema.as_object_mut() {
        map.remove("title");
        map.entry("type").or_insert_with(|| Value::String("object".into()));
    }
    schema
}

fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

// =============================================================================
// Results
// =============================================================================

/// A single content block. Only text is produced by this gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn as_text(&self) -> &str {
        match self {
            ContentBlock::Text { text } => text,
        }
    }
}

/// Outcome of a tool call. `is_error` marks an in-band failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: false,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: true,
        }
    }

    /// All text blocks joined by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

/// Result of a single module's health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    pub detail: String,
}

impl HealthStatus {
    pub fn healthy(detail: impl Into<String>) -> Self {
        Self {
            state: HealthState::Healthy,
            detail: detail.into(),
        }
    }

    pub fn unhealthy(detail: impl Into<String>) -> Self {
        Self {
            state: HealthState::Unhealthy,
            detail: detail.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.state == HealthState::Healthy
    }
}

// =============================================================================
// Module contract
// =============================================================================

/// Failures a module can report from `invoke`.
///
/// `UnknownAction` and `InvalidArguments` are caller errors and surface as
/// protocol errors; everything else becomes an in-band failure result.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{context}: {source}")]
    Backend {
        context: String,
        #[source]
        source: BackendError,
    },

    #[error("{0}")]
    Failed(String),
}

impl ModuleError {
    pub fn backend(context: impl Into<String>, source: BackendError) -> Self {
        Self::Backend {
            context: context.into(),
            source,
        }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// A capability provider registered under a module id.
///
/// Implementations hold only construction-time configuration; every call is
/// independent, so one instance serves concurrent requests.
#[async_trait]
pub trait ToolModule: Send + Sync {
    /// Actions this module answers to, in display order.
    fn list_descriptors(&self) -> Result<Vec<ActionDescriptor>, ModuleError>;

    /// Run one action.
    async fn invoke(&self, action: &str, arguments: Value) -> Result<ToolResult, ModuleError>;

    /// Check the module's backend.
    async fn probe_health(&self) -> Result<HealthStatus, ModuleError>;
}
