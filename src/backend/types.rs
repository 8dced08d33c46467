//! n8n wire types.
//!
//! Only the fields the gateway renders are modelled; everything else in the
//! backend's payloads is ignored on read.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A stored workflow as returned by `/api/v1/workflows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub nodes: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// An execution record from `/api/v1/executions` or the execute endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    #[serde(default, deserialize_with = "opt_id_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub finished: Option<bool>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub stopped_at: Option<String>,
}

impl Execution {
    /// Reported status, falling back to `finished` when `status` is absent.
    pub fn status_label(&self) -> &str {
        match (&self.status, self.finished) {
            (Some(status), _) => status,
            (None, Some(true)) => "success",
            _ => "running",
        }
    }
}

/// A workflow body for the create endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub nodes: Vec<WorkflowNode>,
    pub connections: Value,
    pub settings: Value,
}

/// One node inside a workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub type_version: f64,
    pub position: [i64; 2],
    pub parameters: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Value>,
}

/// n8n wraps some payloads as `{"data": ...}` and returns others bare.
///
/// An object with `data` but no `id` is an envelope; records that carry
/// their own `data` field keep it.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") && !map.contains_key("id") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

// Older n8n versions return numeric ids.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn opt_id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workflow_numeric_id() {
        let wf: Workflow = serde_json::from_value(json!({
            "id": 42,
            "name": "Legacy",
            "active": true,
        }))
        .unwrap();
        assert_eq!(wf.id, "42");
        assert!(wf.nodes.is_empty());
    }

    #[test]
    fn test_execution_defaults() {
        let exec: Execution = serde_json::from_value(json!({})).unwrap();
        assert_eq!(exec, Execution::default());
        assert_eq!(exec.status_label(), "running");
    }

    #[test]
    fn test_execution_status_from_finished() {
        let exec: Execution = serde_json::from_value(json!({
            "id": 7,
            "workflowId": "abc",
            "finished": true,
        }))
        .unwrap();
        assert_eq!(exec.id.as_deref(), Some("7"));
        assert_eq!(exec.workflow_id.as_deref(), Some("abc"));
        assert_eq!(exec.status_label(), "success");
    }

    #[test]
    fn test_unwrap_envelope() {
        assert_eq!(unwrap_envelope(json!({ "data": [1, 2] })), json!([1, 2]));
        assert_eq!(unwrap_envelope(json!([1, 2])), json!([1, 2]));

        let record = json!({ "id": "e1", "data": { "resultData": {} } });
        assert_eq!(unwrap_envelope(record.clone()), record);
    }
}
