//! Audit sinks.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::audit::error::AuditError;

/// Append-only destination for audit lines.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one line; the sink adds the terminator.
    async fn append(&self, line: &str) -> Result<(), AuditError>;
}

/// Appends to a text file, creating it on first use.
///
/// Each line is written with a single `write_all` while holding the lock,
/// so concurrent requests never interleave within a line.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, source: std::io::Error) -> AuditError {
        AuditError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl AuditSink for FileSink {
    async fn append(&self, line: &str) -> Result<(), AuditError> {
        let mut entry = String::with_capacity(line.len() + 1);
        entry.push_str(line);
        entry.push('\n');

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.error(e))?;
        file.write_all(entry.as_bytes())
            .await
            .map_err(|e| self.error(e))?;
        file.flush().await.map_err(|e| self.error(e))?;
        Ok(())
    }
}

/// Discards every line. Used when auditing is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl AuditSink for NullSink {
    async fn append(&self, _line: &str) -> Result<(), AuditError> {
        Ok(())
    }
}
