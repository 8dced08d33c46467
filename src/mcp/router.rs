//! Top-level MCP router: shared by the stdio and HTTP front ends.

use crate::mcp::protocol::{ToolCallParams, ToolsListResult, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST};
use crate::mcp::service::Gateway;
use crate::types::{Error, Result};
use serde_json::Value;

/// Route a tool method to the gateway. Anything else is `MethodNotFound`.
pub async fn route_request(gateway: &dyn Gateway, method: &str, params: Option<Value>) -> Result<Value> {
    match method {
        METHOD_TOOLS_LIST => {
            let tools = gateway.list_tools().await?;
            Ok(serde_json::to_value(ToolsListResult { tools })?)
        }
        METHOD_TOOLS_CALL => {
            let params = call_params(params)?;
            let result = gateway.call_tool(&params.name, params.arguments).await?;
            Ok(serde_json::to_value(result)?)
        }
        _ => Err(Error::method_not_found(format!("Method not found: {}", method))),
    }
}

fn call_params(params: Option<Value>) -> Result<ToolCallParams> {
    let params = params.ok_or_else(|| Error::invalid_params("Missing params for tools/call"))?;
    serde_json::from_value(params)
        .map_err(|e| Error::invalid_params(format!("Invalid tools/call params: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::service::LocalGateway;
    use crate::tools::testing::EchoModule;
    use crate::tools::{ModuleRegistry, DEFAULT_PROBE_TIMEOUT};
    use serde_json::json;
    use std::sync::Arc;

    fn gateway() -> LocalGateway {
        let mut registry = ModuleRegistry::new();
        registry.register("echo", EchoModule).unwrap();
        LocalGateway::new(Arc::new(registry), DEFAULT_PROBE_TIMEOUT)
    }

    #[tokio::test]
    async fn test_tools_list() {
        let value = route_request(&gateway(), "tools/list", None).await.unwrap();
        assert_eq!(value["tools"][0]["name"], "echo:ping");
        assert!(value["tools"][0].get("inputSchema").is_some());
    }

    #[tokio::test]
    async fn test_tools_call() {
        let value = route_request(
            &gateway(),
            "tools/call",
            Some(json!({ "name": "echo:ping", "arguments": {} })),
        )
        .await
        .unwrap();
        assert_eq!(value, json!({ "content": [{ "type": "text", "text": "pong" }] }));
    }

    #[tokio::test]
    async fn test_tools_call_requires_params() {
        let err = route_request(&gateway(), "tools/call", None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));

        let err = route_request(&gateway(), "tools/call", Some(json!({ "arguments": {} })))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let err = route_request(&gateway(), "tools/frobnicate", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Method not found: tools/frobnicate");
        assert_eq!(err.http_status(), 404);
    }
}
