//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → audit (identity + path check, best-effort append)
//!     → OPTIONS? → security::cors preflight, done
//!     → request.rs (target, flattened headers, POST/PUT body)
//!     → forward.rs (one backend request, no retry)
//!     → response.rs (CORS + content headers, 8 KiB streaming)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use request::{flatten_headers, UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
