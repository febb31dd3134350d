//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router that hands every request to a [`Handler`]
//! - Wire up middleware (tracing, timeout, request ID)
//! - Collect request bodies and run handlers on the blocking pool
//! - Compose the configured handler chain (files, redirect, access log)

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use http_body_util::LengthLimitError;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

use crate::config::ServerConfig;
use crate::handler::{FileServer, Handler};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::middleware::{AccessLog, Redirect};
use crate::writer::ResponseBuffer;

/// Errors building the handler chain from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid redirect target: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("invalid status code: {0}")]
    InvalidStatus(u16),
}

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<dyn Handler>,
    pub max_body_bytes: usize,
}

/// HTTP server driving a [`Handler`].
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `handler`.
    pub fn new(config: ServerConfig, handler: impl Handler) -> Self {
        let state = AppState {
            handler: Arc::new(handler),
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Create a server with the handler chain described by `config`.
    pub fn from_config(config: ServerConfig) -> Result<Self, ServerError> {
        let handler = build_handler(&config)?;
        Ok(Self::new(config, handler))
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run the server until `signal` completes, then drain in-flight requests.
    pub async fn run_until<F>(self, listener: TcpListener, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Router with all layers, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Compose `AccessLog(Redirect(FileServer))`, leaving out disabled layers.
pub fn build_handler(config: &ServerConfig) -> Result<Arc<dyn Handler>, ServerError> {
    let files = FileServer::new(&config.files.root);

    let handler: Arc<dyn Handler> = if config.redirect.enabled {
        let redirect = &config.redirect;
        let target = Url::parse(&redirect.target)?;
        Arc::new(
            Redirect::new(files, target)
                .expected(status(redirect.expected_status)?)
                .intended(status(redirect.intended_status)?)
                .discard_body(redirect.discard_body),
        )
    } else {
        Arc::new(files)
    };

    if config.access_log.enabled {
        Ok(Arc::new(AccessLog::new(handler)))
    } else {
        Ok(handler)
    }
}

fn status(code: u16) -> Result<StatusCode, ServerError> {
    StatusCode::from_u16(code).map_err(|_| ServerError::InvalidStatus(code))
}

/// Hands the request to the configured handler with a fresh response buffer.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(
                path = %parts.uri.path(),
                limit = state.max_body_bytes,
                error = %e,
                "Failed to read request body"
            );
            if is_length_limit(&e) {
                return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
            }
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    let request = Request::from_parts(parts, body);
    let handler = state.handler.clone();

    let served = tokio::task::spawn_blocking(move || {
        let mut buffer = ResponseBuffer::new();
        handler.serve(&mut buffer, &request);
        buffer.into_response()
    })
    .await;

    match served {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Handler failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Whether a body read failed because it exceeded the configured limit.
fn is_length_limit(e: &axum::Error) -> bool {
    std::iter::successors(Some(e as &(dyn std::error::Error + 'static)), |e| e.source())
        .any(|e| e.is::<LengthLimitError>())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
