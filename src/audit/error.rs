//! Error types for the audit log.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while appending an audit entry.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The log file could not be opened or written.
    #[error("failed to write audit log {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
