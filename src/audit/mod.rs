//! Audit logging subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (path+query, identity header)
//!     → filter.rs (identity-or-connexion AND prefix match)
//!     → filter.rs (format one line with local timestamp)
//!     → sink.rs (append line + '\n', line-atomic)
//! ```
//!
//! # Design Decisions
//! - Runs before forwarding; never changes how the request is handled
//! - Best-effort: sink failures are logged and swallowed
//! - Prefix set is configuration, injected at construction

pub mod error;
pub mod filter;
pub mod sink;

use std::sync::Arc;

use chrono::Local;

use crate::config::AuditConfig;

pub use error::AuditError;
pub use filter::AuditFilter;
pub use sink::{AuditSink, FileSink, NullSink};

/// Audit filter bound to a sink.
#[derive(Clone)]
pub struct AuditLog {
    filter: AuditFilter,
    sink: Arc<dyn AuditSink>,
}

impl AuditLog {
    pub fn new(filter: AuditFilter, sink: Arc<dyn AuditSink>) -> Self {
        Self { filter, sink }
    }

    /// File-backed log, or a discarding one when auditing is disabled.
    pub fn from_config(config: &AuditConfig) -> Self {
        let sink: Arc<dyn AuditSink> = if config.enabled {
            Arc::new(FileSink::new(&config.log_path))
        } else {
            Arc::new(NullSink)
        };
        Self::new(AuditFilter::new(config.prefixes.iter().cloned()), sink)
    }

    pub fn filter(&self) -> &AuditFilter {
        &self.filter
    }

    /// Audit one request. Returns whether an entry was due.
    ///
    /// A failed append is reported through `tracing` only.
    pub async fn record(&self, path: &str, identity: Option<&str>) -> bool {
        if !self.filter.should_log(path, identity) {
            return false;
        }

        let line = AuditFilter::format(path, identity, &Local::now().naive_local());
        match self.sink.append(&line).await {
            Ok(()) => tracing::debug!(path = %path, "Audit entry written"),
            Err(e) => tracing::error!(path = %path, error = %e, "Failed to write audit entry"),
        }
        true
    }
}
