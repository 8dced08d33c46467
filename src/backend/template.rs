//! Workflow templates handed to the create-workflow endpoint.
//!
//! The scraping template collects business listings for a location and
//! appends them to a Google Sheets spreadsheet.

use crate::backend::types::{WorkflowDefinition, WorkflowNode};
use serde_json::{json, Value};
use uuid::Uuid;

const TRIGGER: &str = "Manual Trigger";
const SCRAPE: &str = "Scrape Listings";
const NORMALIZE: &str = "Normalize Results";
const SHEET: &str = "Append to Sheet";

/// Search term used when the caller does not supply one.
pub const DEFAULT_QUERY: &str = "businesses";

/// Inputs for [`scraping_workflow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapingTemplate {
    /// Workflow name; derived from query and location when absent.
    pub name: Option<String>,
    /// Place to search, e.g. "Lyon, France".
    pub location: String,
    /// Google Sheets spreadsheet id receiving the rows.
    pub destination_id: String,
    /// What to search for.
    pub query: Option<String>,
}

impl ScrapingTemplate {
    pub fn query(&self) -> &str {
        self.query.as_deref().filter(|q| !q.is_empty()).unwrap_or(DEFAULT_QUERY)
    }

    pub fn workflow_name(&self) -> String {
        match self.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("Scraping: {} in {}", self.query(), self.location),
        }
    }
}

/// Build the four-node scraping workflow. Output is deterministic for a given
/// input, node ids included.
pub fn scraping_workflow(template: &ScrapingTemplate) -> WorkflowDefinition {
    let name = template.workflow_name();
    let search = format!("{} {}", template.query(), template.location);

    let nodes = vec![
        node(
            &name,
            TRIGGER,
            "n8n-nodes-base.manualTrigger",
            1.0,
            [0, 0],
            json!({}),
        ),
        node(
            &name,
            SCRAPE,
            "n8n-nodes-base.httpRequest",
            4.2,
            [220, 0],
            json!({
                "method": "GET",
                "url": "https://serpapi.com/search.json",
                "sendQuery": true,
                "queryParameters": {
                    "parameters": [
                        { "name": "engine", "value": "google_maps" },
                        { "name": "q", "value": search },
                        { "name": "type", "value": "search" },
                    ]
                },
                "options": {},
            }),
        ),
        node(
            &name,
            NORMALIZE,
            "n8n-nodes-base.code",
            2.0,
            [440, 0],
            json!({
                "jsCode": normalize_script(&template.location),
            }),
        ),
        WorkflowNode {
            credentials: Some(json!({
                "googleSheetsOAuth2Api": { "name": "Google Sheets account" }
            })),
            ..node(
                &name,
                SHEET,
                "n8n-nodes-base.googleSheets",
                4.5,
                [660, 0],
                json!({
                    "operation": "append",
                    "documentId": {
                        "__rl": true,
                        "mode": "id",
                        "value": template.destination_id,
                    },
                    "sheetName": {
                        "__rl": true,
                        "mode": "name",
                        "value": "Sheet1",
                    },
                    "columns": {
                        "mappingMode": "autoMapInputData",
                        "value": {},
                    },
                    "options": {},
                }),
            )
        },
    ];

    WorkflowDefinition {
        name,
        nodes,
        connections: chain(&[TRIGGER, SCRAPE, NORMALIZE, SHEET]),
        settings: json!({ "executionOrder": "v1" }),
    }
}

fn node(
    workflow: &str,
    name: &str,
    kind: &str,
    type_version: f64,
    position: [i64; 2],
    parameters: Value,
) -> WorkflowNode {
    let seed = format!("{}/{}", workflow, name);
    WorkflowNode {
        id: Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()).to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
        type_version,
        position,
        parameters,
        credentials: None,
    }
}

/// `{"A": {"main": [[{"node": "B", ...}]]}, "B": ...}` wiring nodes in sequence.
fn chain(names: &[&str]) -> Value {
    let mut connections = serde_json::Map::new();
    for pair in names.windows(2) {
        if let [from, to] = pair {
            connections.insert(
                (*from).to_string(),
                json!({ "main": [[{ "node": to, "type": "main", "index": 0 }]] }),
            );
        }
    }
    Value::Object(connections)
}

fn normalize_script(location: &str) -> String {
    let location = serde_json::to_string(location).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"const results = $input.first().json.local_results || [];
return results.map(place => ({{
  json: {{
    name: place.title || '',
    address: place.address || '',
    phone: place.phone || '',
    website: place.website || '',
    rating: place.rating ?? '',
    reviews: place.reviews ?? '',
    location: {location},
    scraped_at: new Date().toISOString(),
  }}
}}));"#
    )
}
