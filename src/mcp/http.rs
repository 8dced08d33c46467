//! HTTP front end: service info, health and a request/response MCP endpoint.

use crate::mcp::protocol::{HttpErrorBody, HttpMcpRequest};
use crate::mcp::router::route_request;
use crate::mcp::service::{Gateway, LocalGateway};
use crate::mcp::SERVICE_NAME;
use crate::tools::dispatch::panic_message;
use crate::types::Error;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
struct AppState {
    gateway: Arc<LocalGateway>,
}

/// Build the HTTP router over a gateway.
pub fn router(gateway: Arc<LocalGateway>) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/mcp", post(mcp))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { gateway })
}

/// HTTP server with cooperative shutdown.
#[derive(Debug)]
pub struct HttpServer {
    gateway: Arc<LocalGateway>,
    addr: SocketAddr,
    cancel: CancellationToken,
}

impl HttpServer {
    pub fn new(gateway: Arc<LocalGateway>, addr: SocketAddr) -> Self {
        Self {
            gateway,
            addr,
            cancel: CancellationToken::new(),
        }
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn serve(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_listener(listener).await
    }

    /// Serve on an already-bound listener until shutdown.
    pub async fn serve_listener(&self, listener: TcpListener) -> std::io::Result<()> {
        tracing::info!(
            addr = %listener.local_addr()?,
            modules = self.gateway.registry().len(),
            "HTTP server listening",
        );

        let cancel = self.cancel.clone();
        axum::serve(listener, router(self.gateway.clone()))
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;

        tracing::info!("HTTP server shutting down");
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

async fn service_info(State(state): State<AppState>) -> Response {
    let tools = match state.gateway.list_tools().await {
        Ok(tools) => tools,
        Err(e) => return error_response(&e),
    };
    let modules: Vec<&str> = state.gateway.registry().ids().collect();
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "modules": modules,
        "tools_count": tools.len(),
        "timestamp": chrono::Utc::now(),
    }))
    .into_response()
}

async fn health(State(state): State<AppState>) -> Response {
    let report = state.gateway.health().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}

async fn mcp(
    State(state): State<AppState>,
    body: Result<Json<HttpMcpRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected MCP request body");
            return body_response(
                StatusCode::BAD_REQUEST,
                HttpErrorBody {
                    error: format!("Invalid request body: {}", rejection.body_text()),
                    code: None,
                },
            );
        }
    };

    let start = Instant::now();
    let result = route_request(state.gateway.as_ref(), &request.method, request.params).await;
    let elapsed_ms = start.elapsed().as_millis();

    match result {
        Ok(value) => {
            tracing::debug!(method = %request.method, elapsed_ms = %elapsed_ms, "Request completed");
            Json(value).into_response()
        }
        Err(e) => {
            tracing::warn!(method = %request.method, elapsed_ms = %elapsed_ms, error = %e, "Request failed");
            error_response(&e)
        }
    }
}

fn error_response(err: &Error) -> Response {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let code = err.is_protocol().then(|| err.to_rpc_code());
    body_response(
        status,
        HttpErrorBody {
            error: err.to_string(),
            code,
        },
    )
}

fn body_response(status: StatusCode, body: HttpErrorBody) -> Response {
    (status, Json(body)).into_response()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic_message(panic.as_ref());
    tracing::error!(error = %message, "HTTP handler panicked");
    body_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        HttpErrorBody {
            error: format!("Internal error: {}", message),
            code: None,
        },
    )
}
