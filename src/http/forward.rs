//! Forwarding to the backend origin.
//!
//! # Responsibilities
//! - Rewrite an inbound request into one outbound request
//! - Relay status, selected headers and the body back to the caller
//! - Surface every I/O boundary as an explicit error value
//!
//! # Design Decisions
//! - One attempt per request: no retries, no timeout
//! - The inbound body is read to completion before the backend is contacted
//! - Once the response head is returned, a failure can only truncate the body

use axum::{
    body::Body,
    http::{uri::InvalidUri, Request, Response, StatusCode},
    response::IntoResponse,
};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::http::request::{build_target, carries_body, flatten_headers, is_transport_header};
use crate::http::response::{declared_length, relay_body, relay_headers};
use crate::security::CorsPolicy;

/// Failures before any response byte reaches the caller.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid backend target `{target}`: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: InvalidUri,
    },

    #[error("failed to read inbound request body: {0}")]
    ReadBody(#[source] axum::Error),

    #[error("failed to build outbound request: {0}")]
    BuildRequest(#[from] axum::http::Error),

    #[error("backend request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl ForwardError {
    /// Status presented to the caller for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::ReadBody(_) => StatusCode::BAD_REQUEST,
            ForwardError::InvalidTarget { .. }
            | ForwardError::BuildRequest(_)
            | ForwardError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Forwards requests to the single backend origin.
pub struct Forwarder {
    origin: String,
    client: Client<HttpsConnector<HttpConnector>, Body>,
    cors: CorsPolicy,
}

impl Forwarder {
    pub fn new(origin: impl Into<String>, cors: CorsPolicy) -> Self {
        // Plain http and https origins share one client.
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self {
            origin: origin.into(),
            client,
            cors,
        }
    }

    /// Send `request` to the backend and return the relayed response.
    ///
    /// Never called for `OPTIONS`; preflights are answered before this point.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        let (parts, body) = request.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let target = build_target(&self.origin, path_and_query)?;

        let mut builder = Request::builder().method(parts.method.clone()).uri(target);
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in flatten_headers(&parts.headers).iter() {
                if !is_transport_header(name) {
                    headers.insert(name.clone(), value.clone());
                }
            }
        }

        let outbound_body = if carries_body(&parts.method) {
            let bytes = axum::body::to_bytes(body, usize::MAX)
                .await
                .map_err(ForwardError::ReadBody)?;
            Body::from(bytes)
        } else {
            Body::empty()
        };
        let outbound = builder.body(outbound_body)?;

        let upstream = self.client.request(outbound).await?;
        Ok(self.relay(upstream))
    }

    fn relay(&self, upstream: Response<Incoming>) -> Response<Body> {
        let (parts, body) = upstream.into_parts();

        // 4xx/5xx bodies are relayed the same way as successes.
        tracing::debug!(
            status = %parts.status,
            error_body = parts.status.as_u16() >= 400,
            content_length = ?declared_length(&parts.headers),
            "Backend responded"
        );

        let mut response = Response::new(relay_body(Body::new(body)));
        *response.status_mut() = parts.status;
        *response.headers_mut() = relay_headers(&parts.headers, &self.cors);
        response
    }
}
