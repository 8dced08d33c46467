//! Application error types.
//!
//! Protocol-level errors live here. Downstream operational failures never
//! become an [`Error`]; the dispatcher folds them into an in-band
//! [`ToolResult`](crate::tools::ToolResult) instead.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// JSON-RPC 2.0 error codes used by the gateway.
pub mod rpc_code {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Main error enum for the gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller sent something that does not satisfy the contract
    /// (malformed tool name, schema-invalid arguments).
    #[error("{0}")]
    InvalidParams(String),

    /// Caller referenced a method, module or action that does not exist.
    #[error("{0}")]
    MethodNotFound(String),

    /// Startup configuration errors (duplicate module ids, bad URLs).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal errors.
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// JSON-RPC error code for the stream transport.
    pub fn to_rpc_code(&self) -> i32 {
        match self {
            Error::InvalidParams(_) => rpc_code::INVALID_PARAMS,
            Error::MethodNotFound(_) => rpc_code::METHOD_NOT_FOUND,
            Error::Serialization(_) => rpc_code::PARSE_ERROR,
            Error::Config(_) | Error::Internal(_) | Error::Io(_) => rpc_code::INTERNAL_ERROR,
        }
    }

    /// HTTP status for the request/response transport.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidParams(_) | Error::Serialization(_) => 400,
            Error::MethodNotFound(_) => 404,
            Error::Config(_) | Error::Internal(_) | Error::Io(_) => 500,
        }
    }

    /// Rebuild a protocol error from a JSON-RPC code received over the wire.
    pub fn from_rpc_code(code: i32, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            rpc_code::INVALID_PARAMS | rpc_code::INVALID_REQUEST => Error::InvalidParams(message),
            rpc_code::METHOD_NOT_FOUND => Error::MethodNotFound(message),
            _ => Error::Internal(message),
        }
    }

    /// Whether this error is a caller contract violation.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::InvalidParams(_) | Error::MethodNotFound(_))
    }
}

// Convenience constructors
impl Error {
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    pub fn method_not_found(msg: impl Into<String>) -> Self {
        Self::MethodNotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
