//! Stdio integration tests: a full MCP session over an in-memory pipe.

use async_trait::async_trait;
use digipal_gateway::mcp::{JsonRpcResponse, LocalGateway, ServerInfo, StdioServer};
use digipal_gateway::tools::{
    ActionDescriptor, HealthStatus, ModuleError, ModuleRegistry, ToolModule, ToolResult,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;

#[derive(Deserialize, JsonSchema)]
struct GreetArgs {
    /// Who to greet.
    name: String,
}

struct GreeterModule;

#[async_trait]
impl ToolModule for GreeterModule {
    fn list_descriptors(&self) -> Result<Vec<ActionDescriptor>, ModuleError> {
        Ok(vec![ActionDescriptor::for_args::<GreetArgs>("greet", "Say hello")])
    }

    async fn invoke(&self, action: &str, arguments: Value) -> Result<ToolResult, ModuleError> {
        match action {
            "greet" => {
                let args: GreetArgs = serde_json::from_value(arguments)
                    .map_err(|e| ModuleError::InvalidArguments(e.to_string()))?;
                if args.name == "crash" {
                    panic!("greeter crashed");
                }
                Ok(ToolResult::success(format!("Hello, {}!", args.name)))
            }
            other => Err(ModuleError::UnknownAction(other.to_string())),
        }
    }

    async fn probe_health(&self) -> Result<HealthStatus, ModuleError> {
        Ok(HealthStatus::healthy("ok"))
    }
}

struct Session {
    writer: WriteHalf<DuplexStream>,
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    task: JoinHandle<std::io::Result<()>>,
}

/// Line cap for sessions in this file; large enough for every request below.
const MAX_MESSAGE_BYTES: usize = 1024;

impl Session {
    fn start() -> Self {
        let mut registry = ModuleRegistry::new();
        registry.register("greeter", GreeterModule).unwrap();
        let gateway = LocalGateway::new(Arc::new(registry), Duration::from_secs(1));
        let server = StdioServer::new(Arc::new(gateway), ServerInfo::new("stdio-test"))
            .with_max_message_bytes(MAX_MESSAGE_BYTES);

        let (client, server_end) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server_end);
        let (client_read, writer) = tokio::io::split(client);

        let task = tokio::spawn(async move {
            server.serve(BufReader::new(server_read), server_write).await
        });

        Self {
            writer,
            lines: BufReader::new(client_read).lines(),
            task,
        }
    }

    async fn send(&mut self, message: &str) {
        self.send_bytes(message.as_bytes()).await;
    }

    async fn send_bytes(&mut self, line: &[u8]) {
        self.writer.write_all(line).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    async fn recv(&mut self) -> JsonRpcResponse {
        let line = self.lines.next_line().await.unwrap().unwrap();
        serde_json::from_str(&line).unwrap()
    }

    async fn request(&mut self, message: Value) -> JsonRpcResponse {
        self.send(&message.to_string()).await;
        self.recv().await
    }

    async fn close(mut self) {
        self.writer.shutdown().await.unwrap();
        self.task.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_full_session() {
    let mut session = Session::start();

    let resp = session
        .request(json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize",
            "params": { "protocolVersion": "2024-11-05", "capabilities": {},
                        "clientInfo": { "name": "test", "version": "0" } }
        }))
        .await;
    assert_eq!(resp.result.unwrap()["serverInfo"]["name"], "stdio-test");

    // No reply to the notification; the next line belongs to id 2.
    session
        .send(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;

    let resp = session
        .request(json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }))
        .await;
    assert_eq!(resp.id, json!(2));
    let tools = resp.result.unwrap()["tools"].clone();
    assert_eq!(tools[0]["name"], "greeter:greet");
    assert_eq!(tools[0]["inputSchema"]["required"], json!(["name"]));

    let resp = session
        .request(json!({
            "jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": { "name": "greeter:greet", "arguments": { "name": "Ada" } }
        }))
        .await;
    assert_eq!(
        resp.result.unwrap(),
        json!({ "content": [{ "type": "text", "text": "Hello, Ada!" }] })
    );

    session.close().await;
}

#[tokio::test]
async fn test_errors_do_not_end_session() {
    let mut session = Session::start();

    session.send("this is not json").await;
    let resp = session.recv().await;
    assert_eq!(resp.error.unwrap().code, -32700);

    session.send_bytes(&[0xff, 0xfe]).await;
    let resp = session.recv().await;
    assert_eq!(resp.id, Value::Null);
    assert_eq!(resp.error.unwrap().code, -32700);

    let oversized = json!({
        "jsonrpc": "2.0", "id": "big", "method": "ping",
        "params": { "pad": "x".repeat(4 * MAX_MESSAGE_BYTES) }
    })
    .to_string();
    session.send(&oversized).await;
    let resp = session.recv().await;
    assert_eq!(resp.id, Value::Null);
    assert_eq!(resp.error.unwrap().code, -32700);

    let resp = session
        .request(json!({
            "jsonrpc": "2.0", "id": "a", "method": "tools/call",
            "params": { "name": "greeter:greet", "arguments": { "name": 5 } }
        }))
        .await;
    assert_eq!(resp.error.unwrap().code, -32602);

    let resp = session
        .request(json!({
            "jsonrpc": "2.0", "id": "b", "method": "tools/call",
            "params": { "name": "greeter:wave", "arguments": {} }
        }))
        .await;
    assert_eq!(resp.error.unwrap().code, -32601);

    let resp = session
        .request(json!({
            "jsonrpc": "2.0", "id": "c", "method": "tools/call",
            "params": { "name": "greeter:greet", "arguments": { "name": "crash" } }
        }))
        .await;
    let result = resp.result.unwrap();
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"].as_str().unwrap().contains("greeter crashed"));

    let resp = session
        .request(json!({ "jsonrpc": "2.0", "id": "d", "method": "ping" }))
        .await;
    assert_eq!(resp.id, json!("d"));
    assert_eq!(resp.result, Some(json!({})));

    session.close().await;
}
