//! Persisted history of delivered links.
//!
//! The history is a single JSON array of normalized link strings, rewritten in
//! full on every append. There is exactly one writer (the relay loop), so no
//! file locking is performed.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read history file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write history file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed store of links that have already been delivered.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    max_entries: Option<usize>,
}

impl HistoryStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_entries: None,
        }
    }

    /// Keep at most `max_entries` links, dropping the oldest on append.
    #[must_use]
    pub fn with_retention(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the delivered links in insertion order.
    ///
    /// A missing, empty, or corrupt file yields an empty history. Corruption is
    /// logged and tolerated; old posts may be delivered again as a result.
    ///
    /// # Errors
    ///
    /// Returns an error only if the file exists but cannot be read.
    pub async fn load(&self) -> Result<Vec<String>, HistoryError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(HistoryError::Read {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };

        let trimmed = data.trim_ascii();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        // Invalid UTF-8 is reported by serde_json as a parse error.
        match serde_json::from_slice::<Vec<String>>(trimmed) {
            Ok(links) => Ok(links),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "History file is corrupt, starting with an empty history"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Check whether `link` has been delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the history file cannot be read.
    pub async fn contains(&self, link: &str) -> Result<bool, HistoryError> {
        Ok(self.load().await?.iter().any(|l| l == link))
    }

    /// Record `link` as delivered.
    ///
    /// Returns `false` without touching the file if the link was already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read or written.
    pub async fn append(&self, link: &str) -> Result<bool, HistoryError> {
        let mut links = self.load().await?;
        if links.iter().any(|l| l == link) {
            debug!(link = %link, "Link already in history");
            return Ok(false);
        }

        links.push(link.to_string());

        if let Some(max) = self.max_entries {
            if links.len() > max {
                let excess = links.len() - max;
                links.drain(..excess);
                debug!(dropped = excess, "Pruned oldest history entries");
            }
        }

        self.save(&links).await?;
        Ok(true)
    }

    async fn save(&self, links: &[String]) -> Result<(), HistoryError> {
        let write_err = |e| HistoryError::Write {
            path: self.path.display().to_string(),
            source: e,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let body = to_pretty_json(links)?;
        tokio::fs::write(&self.path, body).await.map_err(write_err)
    }
}

/// Serialize with four-space indentation.
fn to_pretty_json(links: &[String]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    links.serialize(&mut ser)?;
    Ok(buf)
}
