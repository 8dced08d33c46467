//! HTTP client for the n8n public REST API (`/api/v1`).

use crate::backend::types::{unwrap_envelope, Execution, Workflow, WorkflowDefinition};
use crate::backend::BackendError;
use crate::types::{Credentials, Error, N8nConfig, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Longest backend error body echoed back to the caller.
const MAX_ERROR_BODY: usize = 500;

/// Workflow operations the n8n module needs from the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// Cheap authenticated request used for health checks.
    async fn probe(&self) -> std::result::Result<(), BackendError>;

    async fn list_workflows(&self) -> std::result::Result<Vec<Workflow>, BackendError>;

    async fn get_workflow(&self, id: &str) -> std::result::Result<Workflow, BackendError>;

    async fn create_workflow(
        &self,
        definition: &WorkflowDefinition,
    ) -> std::result::Result<Workflow, BackendError>;

    async fn set_active(&self, id: &str, active: bool)
        -> std::result::Result<Workflow, BackendError>;

    async fn delete_workflow(&self, id: &str) -> std::result::Result<Workflow, BackendError>;

    async fn execute_workflow(
        &self,
        id: &str,
        data: Value,
    ) -> std::result::Result<Execution, BackendError>;

    async fn list_executions(
        &self,
        workflow_id: Option<String>,
        limit: u32,
    ) -> std::result::Result<Vec<Execution>, BackendError>;

    async fn get_execution(&self, id: &str) -> std::result::Result<Execution, BackendError>;
}

/// reqwest-backed [`WorkflowApi`].
#[derive(Debug, Clone)]
pub struct N8nClient {
    http: reqwest::Client,
    base_url: Url,
    read_timeout: Duration,
    execute_timeout: Duration,
    probe_timeout: Duration,
}

impl N8nClient {
    pub fn new(config: &N8nConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::config(format!("invalid n8n url '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!("invalid n8n url '{}'", config.base_url)));
        }

        let http = reqwest::Client::builder()
            .default_headers(auth_headers(&config.credentials)?)
            .build()
            .map_err(|e| Error::config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            read_timeout: config.read_timeout,
            execute_timeout: config.execute_timeout,
            probe_timeout: config.probe_timeout,
        })
    }

    /// Base URL as configured, for display.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Decode("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        budget: Duration,
    ) -> std::result::Result<Value, BackendError> {
        tracing::debug!(%method, %url, "n8n request");

        let mut request = self.http.request(method, url).timeout(budget);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(e, budget))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(body.trim(), MAX_ERROR_BODY),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::from_reqwest(e, budget))?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        budget: Duration,
    ) -> std::result::Result<T, BackendError> {
        let value = self.send(method, url, body, budget).await?;
        serde_json::from_value(unwrap_envelope(value)).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl WorkflowApi for N8nClient {
    async fn probe(&self) -> std::result::Result<(), BackendError> {
        let mut url = self.endpoint(&["workflows"])?;
        url.query_pairs_mut().append_pair("limit", "1");
        self.send(Method::GET, url, None, self.probe_timeout).await?;
        Ok(())
    }

    async fn list_workflows(&self) -> std::result::Result<Vec<Workflow>, BackendError> {
        let url = self.endpoint(&["workflows"])?;
        self.fetch(Method::GET, url, None, self.read_timeout).await
    }

    async fn get_workflow(&self, id: &str) -> std::result::Result<Workflow, BackendError> {
        let url = self.endpoint(&["workflows", id])?;
        self.fetch(Method::GET, url, None, self.read_timeout).await
    }

    async fn create_workflow(
        &self,
        definition: &WorkflowDefinition,
    ) -> std::result::Result<Workflow, BackendError> {
        let url = self.endpoint(&["workflows"])?;
        let body = serde_json::to_value(definition).map_err(|e| BackendError::Decode(e.to_string()))?;
        self.fetch(Method::POST, url, Some(&body), self.read_timeout).await
    }

    async fn set_active(&self, id: &str, active: bool) -> std::result::Result<Workflow, BackendError> {
        let verb = if active { "activate" } else { "deactivate" };
        let url = self.endpoint(&["workflows", id, verb])?;
        self.fetch(Method::POST, url, None, self.read_timeout).await
    }

    async fn delete_workflow(&self, id: &str) -> std::result::Result<Workflow, BackendError> {
        let url = self.endpoint(&["workflows", id])?;
        self.fetch(Method::DELETE, url, None, self.read_timeout).await
    }

    async fn execute_workflow(
        &self,
        id: &str,
        data: Value,
    ) -> std::result::Result<Execution, BackendError> {
        let url = self.endpoint(&["workflows", id, "execute"])?;
        let body = serde_json::json!({ "data": data });
        let value = self.send(Method::POST, url, Some(&body), self.execute_timeout).await?;
        match unwrap_envelope(value) {
            Value::Null => Ok(Execution::default()),
            other => serde_json::from_value(other).map_err(|e| BackendError::Decode(e.to_string())),
        }
    }

    async fn list_executions(
        &self,
        workflow_id: Option<String>,
        limit: u32,
    ) -> std::result::Result<Vec<Execution>, BackendError> {
        let mut url = self.endpoint(&["executions"])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(workflow_id) = &workflow_id {
                query.append_pair("workflowId", workflow_id);
            }
            query.append_pair("limit", &limit.to_string());
        }
        self.fetch(Method::GET, url, None, self.read_timeout).await
    }

    async fn get_execution(&self, id: &str) -> std::result::Result<Execution, BackendError> {
        let url = self.endpoint(&["executions", id])?;
        self.fetch(Method::GET, url, None, self.read_timeout).await
    }
}

fn auth_headers(credentials: &Credentials) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    match credentials {
        Credentials::None => {}
        Credentials::ApiKey { key } => {
            let mut value = HeaderValue::from_str(key)
                .map_err(|_| Error::config("n8n api key contains invalid header characters"))?;
            value.set_sensitive(true);
            headers.insert("x-n8n-api-key", value);
        }
        Credentials::Basic { username, password } => {
            let token = STANDARD.encode(format!("{}:{}", username, password));
            let mut value = HeaderValue::from_str(&format!("Basic {}", token))
                .map_err(|_| Error::config("n8n basic auth produced an invalid header"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
    }

    Ok(headers)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}
