//! MCP transports.
//!
//! Every front end talks to a [`Gateway`]: the stdio server and the HTTP
//! router both route through [`route_request`], and [`HttpRelay`] is a
//! gateway that forwards to a remote HTTP instance.

pub mod codec;
pub mod http;
pub mod protocol;
pub mod relay;
pub mod router;
pub mod server;
pub mod service;

/// Name reported by `GET /` and `initialize`.
pub const SERVICE_NAME: &str = "MyDigiPal MCP Server";

pub use http::{router as http_router, HttpServer};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, ServerInfo, PROTOCOL_VERSION};
pub use relay::HttpRelay;
pub use router::route_request;
pub use server::StdioServer;
pub use service::{Gateway, LocalGateway};
