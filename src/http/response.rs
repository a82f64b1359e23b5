//! Response handling and transformation.
//!
//! # Responsibilities
//! - Compose client headers: CORS, plus Content-Type / Content-Disposition
//!   when the backend sent them
//! - Declare the backend's content length only when it is known
//! - Stream the backend body in bounded chunks
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Backend 4xx/5xx bodies are relayed like any other body
//! - An unknown length is left undeclared (chunked), never sent as a sentinel

use axum::{
    body::{Body, Bytes},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue,
    },
};
use futures_util::{stream, StreamExt};

use crate::security::CorsPolicy;

/// Largest chunk written to the client in one frame.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Backend content length, `None` when absent or unparsable.
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Headers sent to the client for a relayed backend response.
pub fn relay_headers(upstream: &HeaderMap, cors: &CorsPolicy) -> HeaderMap {
    let mut headers = HeaderMap::new();
    cors.apply(&mut headers);

    for name in [CONTENT_TYPE, CONTENT_DISPOSITION] {
        if let Some(value) = upstream.get(&name) {
            headers.insert(name, value.clone());
        }
    }

    if let Some(length) = declared_length(upstream) {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    }
    headers
}

/// Split `bytes` into pieces of at most `size` bytes without copying.
pub fn rechunk(mut bytes: Bytes, size: usize) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(bytes.len().div_ceil(size.max(1)));
    while bytes.len() > size {
        chunks.push(bytes.split_to(size));
    }
    if !bytes.is_empty() {
        chunks.push(bytes);
    }
    chunks
}

/// Wrap a backend body so it reaches the client in `CHUNK_SIZE` frames.
///
/// Dropping the returned body drops the backend stream with it.
pub fn relay_body(upstream: Body) -> Body {
    let chunks = upstream.into_data_stream().flat_map(|frame| {
        let items: Vec<Result<Bytes, axum::Error>> = match frame {
            Ok(bytes) => rechunk(bytes, CHUNK_SIZE).into_iter().map(Ok).collect(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(items)
    });
    Body::from_stream(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;

    fn cors() -> CorsPolicy {
        CorsPolicy::new("http://localhost:4200", "Mail").unwrap()
    }

    #[test]
    fn length_only_when_declared() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_length(&headers), None);

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("-1"));
        assert_eq!(declared_length(&headers), None);

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("42"));
        assert_eq!(declared_length(&headers), Some(42));
    }

    #[test]
    fn relays_content_headers_when_present() {
        let mut upstream = HeaderMap::new();
        upstream.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
        upstream.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"a.pdf\""),
        );
        upstream.insert("x-internal", HeaderValue::from_static("secret"));
        upstream.insert(CONTENT_LENGTH, HeaderValue::from_static("10"));

        let headers = relay_headers(&upstream, &cors());

        assert_eq!(headers[CONTENT_TYPE], "application/pdf");
        assert_eq!(headers[CONTENT_DISPOSITION], "attachment; filename=\"a.pdf\"");
        assert_eq!(headers[CONTENT_LENGTH], "10");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:4200");
        assert!(headers.get("x-internal").is_none());
    }

    #[test]
    fn missing_content_headers_are_not_an_error() {
        let headers = relay_headers(&HeaderMap::new(), &cors());
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert!(headers.get(CONTENT_DISPOSITION).is_none());
        assert!(headers.get(CONTENT_LENGTH).is_none());
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn rechunk_respects_boundary() {
        let exact = rechunk(Bytes::from(vec![1u8; CHUNK_SIZE]), CHUNK_SIZE);
        assert_eq!(exact.len(), 1);

        let over = rechunk(Bytes::from(vec![1u8; CHUNK_SIZE + 1]), CHUNK_SIZE);
        assert_eq!(over.iter().map(Bytes::len).collect::<Vec<_>>(), vec![CHUNK_SIZE, 1]);

        assert!(rechunk(Bytes::new(), CHUNK_SIZE).is_empty());
    }

    #[tokio::test]
    async fn relay_body_preserves_bytes() {
        let payload: Vec<u8> = (0..(3 * CHUNK_SIZE + 17)).map(|i| (i % 251) as u8).collect();
        let body = relay_body(Body::from(payload.clone()));

        let collected = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(collected.as_ref(), payload.as_slice());
    }
}
