//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields, request ID)
//!     → logging.rs subscriber (stdout, pretty or JSON)
//! ```
//!
//! The audit trail is separate: it goes to the audit sink, not to `tracing`.

pub mod logging;
