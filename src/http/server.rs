//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Audit every request before it is handled
//! - Answer preflights locally, forward everything else
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{InvalidHeaderName, InvalidHeaderValue},
        HeaderName, Method, Request,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::audit::AuditLog;
use crate::config::ProxyConfig;
use crate::http::forward::Forwarder;
use crate::http::request::{identity, UuidRequestId, X_REQUEST_ID};
use crate::security::CorsPolicy;

/// Errors building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid CORS header value: {0}")]
    Cors(#[from] InvalidHeaderValue),

    #[error("invalid identity header name: {0}")]
    IdentityHeader(#[from] InvalidHeaderName),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub audit: Arc<AuditLog>,
    pub cors: CorsPolicy,
    pub identity_header: HeaderName,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let audit = AuditLog::from_config(&config.audit);
        Self::with_audit(config, audit)
    }

    /// Create a server writing audit entries to `audit`.
    pub fn with_audit(config: ProxyConfig, audit: AuditLog) -> Result<Self, ServerError> {
        let cors = CorsPolicy::from_config(&config.cors)?;
        let identity_header = HeaderName::from_bytes(config.cors.identity_header.as_bytes())?;
        let forwarder = Forwarder::new(config.backend.origin.clone(), cors.clone());

        let state = AppState {
            forwarder: Arc::new(forwarder),
            audit: Arc::new(audit),
            cors,
            identity_header,
        };

        Ok(Self {
            router: Self::build_router(state),
            config: Arc::new(config),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config().backend.origin,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Audits, then answers the preflight or forwards the request.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    state
        .audit
        .record(
            &path,
            identity(request.headers(), &state.identity_header).as_deref(),
        )
        .await;

    if method == Method::OPTIONS {
        return state.cors.preflight();
    }

    match state.forwarder.forward(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Upstream error");
            let mut response = e.into_response();
            state.cors.apply(response.headers_mut());
            response
        }
    }
}
