//! DigiPal gateway - main entry point.
//!
//! Serves the built-in tool modules over one of three transports:
//! - stdio: newline-delimited JSON-RPC for local MCP clients
//! - http: `/`, `/health` and `/mcp` for hosted deployments
//! - relay: stdio front end forwarding to a remote HTTP gateway

use clap::{Parser, ValueEnum};
use digipal_gateway::mcp::{
    HttpRelay, HttpServer, LocalGateway, ServerInfo, StdioServer, SERVICE_NAME,
};
use digipal_gateway::modules::builtin_registry;
use digipal_gateway::types::{Credentials, TransportMode, DEFAULT_N8N_URL, DEFAULT_RELAY_URL};
use digipal_gateway::{observability, Config};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Transport selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportArg {
    Stdio,
    Http,
    Relay,
}

impl From<TransportArg> for TransportMode {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Stdio => TransportMode::Stdio,
            TransportArg::Http => TransportMode::Http,
            TransportArg::Relay => TransportMode::Relay,
        }
    }
}

/// MCP tool gateway for n8n workflow automation
#[derive(Parser, Debug)]
#[command(name = "digipal-gateway")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Transport to serve (defaults to http on hosted platforms, stdio otherwise)
    #[arg(long, env = "GATEWAY_TRANSPORT", value_enum)]
    transport: Option<TransportArg>,

    /// HTTP listen port
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Set by the hosting platform
    #[arg(long, env = "RENDER", hide = true)]
    render: Option<String>,

    /// Deployment environment
    #[arg(long, env = "NODE_ENV", hide = true)]
    node_env: Option<String>,

    /// n8n base URL
    #[arg(long, env = "N8N_URL", default_value = DEFAULT_N8N_URL)]
    n8n_url: String,

    /// n8n API key (takes precedence over basic auth)
    #[arg(long, env = "N8N_API_KEY", hide_env_values = true)]
    n8n_api_key: Option<String>,

    /// n8n basic auth user
    #[arg(long, env = "N8N_BASIC_AUTH_USER")]
    n8n_user: Option<String>,

    /// n8n basic auth password
    #[arg(long, env = "N8N_BASIC_AUTH_PASSWORD", hide_env_values = true)]
    n8n_password: Option<String>,

    /// Timeout for n8n read and CRUD calls, in seconds
    #[arg(long, env = "N8N_READ_TIMEOUT_SECS", default_value_t = 10)]
    read_timeout_secs: u64,

    /// Timeout for workflow execution, in seconds
    #[arg(long, env = "N8N_EXECUTE_TIMEOUT_SECS", default_value_t = 60)]
    execute_timeout_secs: u64,

    /// Per-module health probe timeout, in seconds
    #[arg(long, env = "GATEWAY_PROBE_TIMEOUT_SECS", default_value_t = 5)]
    probe_timeout_secs: u64,

    /// Remote `/mcp` endpoint for relay mode
    #[arg(long, env = "GATEWAY_RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    relay_url: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "GATEWAY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Explicit flag first, then the hosting environment.
    fn resolve_transport(&self) -> TransportMode {
        if let Some(transport) = self.transport {
            return transport.into();
        }
        let hosted = self.render.is_some() || self.node_env.as_deref() == Some("production");
        if hosted {
            TransportMode::Http
        } else {
            TransportMode::Stdio
        }
    }

    fn into_config(self) -> Config {
        let mut config = Config::default();
        config.server.transport = self.resolve_transport();
        config.server.port = self.port;
        config.server.relay_url = self.relay_url;
        config.server.probe_timeout = Duration::from_secs(self.probe_timeout_secs);

        config.n8n.base_url = self.n8n_url;
        config.n8n.credentials =
            Credentials::from_parts(self.n8n_api_key, self.n8n_user, self.n8n_password);
        config.n8n.read_timeout = Duration::from_secs(self.read_timeout_secs);
        config.n8n.execute_timeout = Duration::from_secs(self.execute_timeout_secs);
        config.n8n.probe_timeout = Duration::from_secs(self.probe_timeout_secs);

        config.observability.log_level = self.log_level;
        config.observability.json_logs = self.json_logs;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config();

    // Logs go to stderr; stdout is reserved for the stdio protocol
    observability::init_tracing(&config.observability);

    tracing::info!(
        transport = %config.server.transport,
        backend = %config.n8n.base_url,
        credentials = ?config.n8n.credentials,
        "{} v{} starting",
        SERVICE_NAME,
        env!("CARGO_PKG_VERSION"),
    );

    let info = ServerInfo::new(SERVICE_NAME);
    match config.server.transport {
        TransportMode::Stdio => {
            let registry = builtin_registry(&config)?;
            let gateway = LocalGateway::new(Arc::new(registry), config.server.probe_timeout);
            StdioServer::new(Arc::new(gateway), info).serve_stdio().await?;
        }
        TransportMode::Http => {
            let registry = builtin_registry(&config)?;
            let gateway = LocalGateway::new(Arc::new(registry), config.server.probe_timeout);
            let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
            let server = HttpServer::new(Arc::new(gateway), addr);

            let cancel = server.cancel_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Shutdown signal received");
                    cancel.cancel();
                }
            });

            server.serve().await?;
        }
        TransportMode::Relay => {
            let relay = HttpRelay::new(&config.server.relay_url, config.server.relay_timeout)?;
            tracing::info!(url = %relay.url(), "Relaying tool calls");
            StdioServer::new(Arc::new(relay), info).serve_stdio().await?;
        }
    }

    Ok(())
}
