//! Core types for the gateway.
//!
//! This module provides foundational types used throughout the system:
//! - **Names**: Validated module ids and `<module>:<action>` parsing
//! - **Errors**: Protocol error types with thiserror derives
//! - **Config**: Configuration structures for server, backend, and logging

mod config;
mod errors;
mod names;

pub use config::{
    Config, Credentials, N8nConfig, ObservabilityConfig, ServerConfig, TransportMode,
    DEFAULT_N8N_URL, DEFAULT_RELAY_URL,
};
pub use errors::{rpc_code, Error, Result};
pub use names::{qualify, ModuleId, QualifiedName, DELIMITER};
