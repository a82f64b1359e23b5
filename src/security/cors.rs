//! CORS response headers and the preflight responder.
//!
//! # Responsibilities
//! - Hold the four `Access-Control-*` headers for the one allowed origin
//! - Stamp them on every response, errors included
//! - Answer `OPTIONS` preflights without contacting the backend
//!
//! # Design Decisions
//! - Header values are built once from configuration and cloned per response
//! - The preflight additionally advertises `Content-Length` and `X-Requested-With`

use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, InvalidHeaderValue,
        },
        HeaderMap, HeaderValue, Response, StatusCode,
    },
};

use crate::config::CorsConfig;

/// Methods the frontend may use.
pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS, PUT, DELETE";

/// Request headers allowed on forwarded responses, before the identity header.
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Request headers advertised by the preflight, before the identity header.
pub const PREFLIGHT_ALLOWED_HEADERS: &str =
    "Content-Type, Authorization, Content-Length, X-Requested-With";

/// Precomputed CORS headers for a single allowed origin.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_headers: HeaderValue,
    preflight_allow_headers: HeaderValue,
}

impl CorsPolicy {
    /// Build the policy for `allowed_origin`, advertising `identity_header`
    /// as an allowed request header.
    pub fn new(allowed_origin: &str, identity_header: &str) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(allowed_origin)?,
            allow_headers: HeaderValue::from_str(&format!(
                "{}, {}",
                ALLOWED_HEADERS, identity_header
            ))?,
            preflight_allow_headers: HeaderValue::from_str(&format!(
                "{}, {}",
                PREFLIGHT_ALLOWED_HEADERS, identity_header
            ))?,
        })
    }

    pub fn from_config(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
        Self::new(&config.allowed_origin, &config.identity_header)
    }

    /// Insert the four CORS headers, replacing any existing values.
    pub fn apply(&self, headers: &mut HeaderMap) {
        self.insert(headers, self.allow_headers.clone());
    }

    /// Response to an `OPTIONS` request: 200, CORS headers, no body.
    pub fn preflight(&self) -> Response<Body> {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        self.insert(response.headers_mut(), self.preflight_allow_headers.clone());
        response
    }

    fn insert(&self, headers: &mut HeaderMap, allow_headers: HeaderValue) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}
