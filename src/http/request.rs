//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Extract the caller identity header
//! - Build the backend target by concatenating origin and path+query
//! - Flatten multi-valued headers for the outbound request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Header flattening is lossy by contract: repeated keys become one
//!   comma-joined value
//! - Only POST and PUT carry a body to the backend

use std::borrow::Cow;

use axum::http::{
    header::{CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING},
    HeaderMap, HeaderName, HeaderValue, Method, Request, Uri,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::forward::ForwardError;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a fresh UUID v4 request ID for requests that lack one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// First value of the identity header, taken as opaque text.
///
/// Bytes that are not UTF-8 are replaced rather than dropping the identity.
pub fn identity<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<Cow<'a, str>> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
}

/// Collapse every key to a single value, joining repeats with `,`.
pub fn flatten_headers(headers: &HeaderMap) -> HeaderMap {
    let mut flat = HeaderMap::with_capacity(headers.keys_len());
    for name in headers.keys() {
        let mut joined: Vec<u8> = Vec::new();
        for (i, value) in headers.get_all(name).iter().enumerate() {
            if i > 0 {
                joined.push(b',');
            }
            joined.extend_from_slice(value.as_bytes());
        }
        if let Ok(value) = HeaderValue::from_bytes(&joined) {
            flat.insert(name.clone(), value);
        }
    }
    flat
}

/// Headers the outbound connection computes for itself.
pub fn is_transport_header(name: &HeaderName) -> bool {
    name == HOST || name == CONTENT_LENGTH || name == TRANSFER_ENCODING || name == CONNECTION
}

/// Whether the inbound body is relayed for this method.
pub fn carries_body(method: &Method) -> bool {
    method == Method::POST || method == Method::PUT
}

/// `origin` followed by `path_and_query`, with no normalization.
pub fn build_target(origin: &str, path_and_query: &str) -> Result<Uri, ForwardError> {
    let target = format!("{}{}", origin, path_and_query);
    target
        .parse::<Uri>()
        .map_err(|source| ForwardError::InvalidTarget { target, source })
}
