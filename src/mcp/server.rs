//! Stdio MCP server: read loop and per-message handler.
//!
//! Messages are processed one at a time in arrival order. Writing a response
//! awaits the output stream, so a slow reader applies backpressure.

use crate::mcp::codec::{read_message, write_message, Frame, DEFAULT_MAX_MESSAGE_BYTES};
use crate::mcp::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ServerInfo, METHOD_INITIALIZE, METHOD_PING,
    PROTOCOL_VERSION,
};
use crate::mcp::router::route_request;
use crate::mcp::service::Gateway;
use crate::tools::dispatch::panic_message;
use crate::types::{Error, Result};
use futures::FutureExt;
use serde_json::{json, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};

/// JSON-RPC server over a line-delimited byte stream.
pub struct StdioServer {
    gateway: Arc<dyn Gateway>,
    info: ServerInfo,
    max_message_bytes: usize,
}

impl std::fmt::Debug for StdioServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdioServer")
            .field("info", &self.info)
            .field("max_message_bytes", &self.max_message_bytes)
            .finish_non_exhaustive()
    }
}

impl StdioServer {
    pub fn new(gateway: Arc<dyn Gateway>, info: ServerInfo) -> Self {
        Self {
            gateway,
            info,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    pub fn with_max_message_bytes(mut self, max_message_bytes: usize) -> Self {
        self.max_message_bytes = max_message_bytes;
        self
    }

    /// Serve the process's stdin/stdout until stdin closes.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve an arbitrary stream pair until the reader reaches EOF.
    ///
    /// Unreadable lines are answered with a parse error; only I/O failures
    /// end the session.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(server = %self.info.name, "MCP stdio server connected");

        while let Some(frame) = read_message(&mut reader, self.max_message_bytes).await? {
            let response = match frame {
                Frame::Message(line) if line.trim().is_empty() => continue,
                Frame::Message(line) => self.handle_message(&line).await,
                Frame::TooLarge => {
                    tracing::warn!(max_bytes = self.max_message_bytes, "Discarded oversized message");
                    Some(unreadable(format!(
                        "message exceeds {} bytes",
                        self.max_message_bytes
                    )))
                }
                Frame::InvalidUtf8 => {
                    tracing::warn!("Discarded message with invalid UTF-8");
                    Some(unreadable("message is not valid UTF-8"))
                }
            };
            if let Some(response) = response {
                write_message(&mut writer, &response).await?;
            }
        }

        tracing::info!("MCP stdio server shutting down (EOF)");
        Ok(())
    }

    /// Handle one raw message. Returns `None` for notifications.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON-RPC message");
                return Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error(e)));
            }
        };

        let id = raw.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ));
            }
        };
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!(
                    "Invalid JSON-RPC version: {}",
                    request.jsonrpc
                )),
            ));
        }

        let start = Instant::now();
        let method = request.method.clone();
        let result = self.handle_request(request.method.as_str(), request.params).await;
        let elapsed_ms = start.elapsed().as_millis();

        let Some(id) = request.id else {
            if let Err(e) = result {
                tracing::debug!(method = %method, error = %e, "Notification ignored");
            }
            return None;
        };

        Some(match result {
            Ok(value) => {
                tracing::debug!(method = %method, elapsed_ms = %elapsed_ms, "Request completed");
                JsonRpcResponse::success(id, value)
            }
            Err(e) => {
                tracing::warn!(method = %method, elapsed_ms = %elapsed_ms, error = %e, "Request failed");
                JsonRpcResponse::error(id, JsonRpcError::from(&e))
            }
        })
    }

    async fn handle_request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        match method {
            METHOD_INITIALIZE => Ok(self.initialize_result(params.as_ref())),
            METHOD_PING => Ok(json!({})),
            m if m.starts_with("notifications/") => Ok(Value::Null),
            _ => {
                let routed = AssertUnwindSafe(route_request(self.gateway.as_ref(), method, params))
                    .catch_unwind()
                    .await;
                routed.unwrap_or_else(|panic| {
                    Err(Error::internal(panic_message(panic.as_ref())))
                })
            }
        }
    }

    fn initialize_result(&self, params: Option<&Value>) -> Value {
        let version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);
        json!({
            "protocolVersion": version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": self.info,
        })
    }
}

/// Parse error for a line that never reached the JSON parser.
fn unreadable(detail: impl std::fmt::Display) -> JsonRpcResponse {
    JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error(detail))
}
