//! Configuration structures.
//!
//! The binary fills these from CLI flags and environment variables; the
//! library only ever sees the typed form.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default n8n instance.
pub const DEFAULT_N8N_URL: &str = "https://n8n.mydigipal.com";

/// Default remote gateway for relay mode.
pub const DEFAULT_RELAY_URL: &str = "https://mydigipal-mcp-server.onrender.com/mcp";

/// Global gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// n8n backend configuration.
    #[serde(default)]
    pub n8n: N8nConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Which front end the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// HTTP surface (`/`, `/health`, `/mcp`).
    Http,
    /// Stdio front end forwarding to a remote HTTP gateway.
    Relay,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransportMode::Stdio => "stdio",
            TransportMode::Http => "http",
            TransportMode::Relay => "relay",
        };
        f.write_str(s)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Active transport.
    pub transport: TransportMode,

    /// HTTP listen port (all interfaces).
    pub port: u16,

    /// Remote `/mcp` endpoint used by relay mode.
    pub relay_url: String,

    /// Per-request timeout for relay mode.
    #[serde(with = "humantime_serde")]
    pub relay_timeout: Duration,

    /// Per-module health probe budget.
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportMode::Stdio,
            port: 3000,
            relay_url: DEFAULT_RELAY_URL.to_string(),
            relay_timeout: Duration::from_secs(90),
            probe_timeout: Duration::from_secs(5),
        }
    }
}

/// Credentials for the n8n API. The API key wins when both are present.
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credentials {
    #[default]
    None,
    ApiKey { key: String },
    Basic { username: String, password: String },
}

impl Credentials {
    /// Pick the credential the way the environment supplies it.
    pub fn from_parts(
        api_key: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        match (api_key.filter(|k| !k.is_empty()), username, password) {
            (Some(key), _, _) => Credentials::ApiKey { key },
            (None, Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Credentials::Basic { username, password }
            }
            _ => Credentials::None,
        }
    }
}

// Keep secrets out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::None => f.write_str("None"),
            Credentials::ApiKey { .. } => f.write_str("ApiKey(***)"),
            Credentials::Basic { username, .. } => write!(f, "Basic({username}:***)"),
        }
    }
}

/// n8n backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct N8nConfig {
    /// Base URL of the n8n instance, without the `/api/v1` suffix.
    pub base_url: String,

    /// Authentication material.
    #[serde(default)]
    pub credentials: Credentials,

    /// Budget for read queries and CRUD calls.
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,

    /// Budget for workflow execution.
    #[serde(with = "humantime_serde")]
    pub execute_timeout: Duration,

    /// Budget for the health probe request.
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
}

impl Default for N8nConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_N8N_URL.to_string(),
            credentials: Credentials::None,
            read_timeout: Duration::from_secs(10),
            execute_timeout: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(5),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Fallback filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_takes_precedence() {
        let creds = Credentials::from_parts(
            Some("k".into()),
            Some("u".into()),
            Some("p".into()),
        );
        assert_eq!(creds, Credentials::ApiKey { key: "k".into() });
    }

    #[test]
    fn test_basic_requires_both_parts() {
        assert_eq!(
            Credentials::from_parts(None, Some("u".into()), None),
            Credentials::None
        );
        assert_eq!(
            Credentials::from_parts(Some(String::new()), Some("u".into()), Some("p".into())),
            Credentials::Basic {
                username: "u".into(),
                password: "p".into()
            }
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::Basic {
            username: "alice".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_config_deserializes_humantime() {
        let cfg: N8nConfig = serde_json::from_value(serde_json::json!({
            "base_url": "http://localhost:5678",
            "read_timeout": "3s",
            "execute_timeout": "2m",
            "probe_timeout": "500ms",
        }))
        .unwrap();
        assert_eq!(cfg.read_timeout, Duration::from_secs(3));
        assert_eq!(cfg.execute_timeout, Duration::from_secs(120));
        assert_eq!(cfg.probe_timeout, Duration::from_millis(500));
        assert_eq!(cfg.credentials, Credentials::None);
    }
}
