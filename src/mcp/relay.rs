//! Gateway that forwards tool methods to a remote HTTP gateway.
//!
//! Pair it with [`StdioServer`](crate::mcp::StdioServer) to bridge a local MCP
//! client to a deployed instance.

use crate::mcp::protocol::{
    HttpErrorBody, HttpMcpRequest, ToolCallParams, ToolsListResult, METHOD_TOOLS_CALL,
    METHOD_TOOLS_LIST,
};
use crate::mcp::service::Gateway;
use crate::tools::{ToolDescriptor, ToolResult};
use crate::types::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug)]
enum RelayFailure {
    /// The remote answered with an error body.
    Remote(Error),
    /// The remote could not be reached or answered with garbage.
    Transport(String),
}

/// Remote gateway reached over `POST /mcp`.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    http: reqwest::Client,
    url: reqwest::Url,
}

impl HttpRelay {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| Error::config(format!("invalid relay URL '{}': {}", url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn post<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> std::result::Result<T, RelayFailure> {
        let body = HttpMcpRequest {
            method: method.to_string(),
            params,
        };
        let response = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayFailure::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RelayFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RelayFailure::Remote(remote_error(status.as_u16(), &bytes)));
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| RelayFailure::Transport(format!("unexpected response from relay: {}", e)))
    }
}

/// Map a remote error response back to a local error.
fn remote_error(status: u16, body: &[u8]) -> Error {
    let parsed: Option<HttpErrorBody> = serde_json::from_slice(body).ok();
    match parsed {
        Some(HttpErrorBody {
            error,
            code: Some(code),
        }) => Error::from_rpc_code(code, error),
        Some(HttpErrorBody { error, code: None }) => match status {
            404 => Error::method_not_found(error),
            400 => Error::invalid_params(error),
            _ => Error::internal(format!("relay returned {}: {}", status, error)),
        },
        None => Error::internal(format!(
            "relay returned {}: {}",
            status,
            String::from_utf8_lossy(body)
        )),
    }
}

#[async_trait]
impl Gateway for HttpRelay {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        match self.post::<ToolsListResult>(METHOD_TOOLS_LIST, None).await {
            Ok(result) => Ok(result.tools),
            Err(RelayFailure::Remote(e)) => Err(e),
            Err(RelayFailure::Transport(detail)) => {
                tracing::warn!(url = %self.url, error = %detail, "Relay unreachable");
                Err(Error::internal(format!("relay unreachable: {}", detail)))
            }
        }
    }

    async fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<ToolResult> {
        let params = serde_json::to_value(ToolCallParams {
            name: name.to_string(),
            arguments,
        })?;
        match self.post::<ToolResult>(METHOD_TOOLS_CALL, Some(params)).await {
            Ok(result) => Ok(result),
            Err(RelayFailure::Remote(e)) if e.is_protocol() => Err(e),
            Err(RelayFailure::Remote(e)) => Ok(ToolResult::failure(format!("Error: {}", e))),
            Err(RelayFailure::Transport(detail)) => {
                tracing::warn!(url = %self.url, tool = %name, error = %detail, "Relay unreachable");
                Ok(ToolResult::failure(format!("Error: relay unreachable: {}", detail)))
            }
        }
    }
}
