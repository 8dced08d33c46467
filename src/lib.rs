//! # DigiPal Gateway - MCP Tool Gateway
//!
//! Exposes a set of tool modules to MCP clients under one namespaced catalog:
//! - Module registry keyed by module id, built once at startup
//! - Namespaced catalog (`<module>:<action>`) with JSON Schema inputs
//! - Dispatcher separating protocol errors from in-band tool failures
//! - Concurrent health aggregation with per-module isolation
//! - Stdio (JSON-RPC) and HTTP transports, plus a relay to a remote gateway
//! - n8n workflow automation module backed by the n8n REST API
//!
//! ## Architecture
//!
//! ```text
//!   stdio / HTTP / relay
//!           │
//!           ▼
//!   ┌─────────────────┐     ┌──────────────────────────────┐
//!   │ Gateway trait   │ ──▶ │ catalog · dispatch · health  │
//!   └─────────────────┘     └──────────────┬───────────────┘
//!                                          ▼
//!                           ┌──────────────────────────────┐
//!                           │ ModuleRegistry               │
//!                           │   n8n ──▶ WorkflowApi (REST) │
//!                           └──────────────────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod backend;
pub mod mcp;
pub mod modules;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
