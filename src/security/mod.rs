//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Every response:
//!     → cors.rs (stamp Access-Control-* headers)
//!
//! OPTIONS request:
//!     → cors.rs (preflight answered locally, backend never contacted)
//! ```
//!
//! # Design Decisions
//! - One allowed origin, credentials allowed
//! - The identity header is trusted verbatim; no authentication happens here

pub mod cors;

pub use cors::CorsPolicy;
