//! CORS-aware forwarding proxy with an audit trail.
//!
//! Sits between a browser frontend and a single backend API: every request is
//! rewritten onto the backend origin, bodies are streamed both ways, CORS
//! headers are stamped on every response, and requests to sensitive paths are
//! appended to an audit log.

pub mod audit;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use audit::{AuditFilter, AuditLog};
pub use config::schema::ProxyConfig;
pub use http::{Forwarder, HttpServer};
pub use lifecycle::Shutdown;
