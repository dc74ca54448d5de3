//! File-based history store — a single pretty-printed JSON array.
//!
//! Storage location defaults to `memory/history.json` relative to the working
//! directory. The file is human-inspectable and editable:
//!
//! ```json
//! [
//!   {
//!     "type": "human",
//!     "content": "Do you ship to Canada?"
//!   },
//!   {
//!     "type": "ai",
//!     "content": "Yes, within 5 business days."
//!   }
//! ]
//! ```
//!
//! Every save rewrites the whole file through a temporary sibling that is
//! synced and renamed into place, so a reader never sees a torn write.

use async_trait::async_trait;
use deskmate_core::error::HistoryError;
use deskmate_core::store::HistoryStore;
use deskmate_core::turn::History;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// A file-backed history store.
///
/// Nothing is cached: `load` always reads the file and `save` always writes
/// it. The session owns the in-memory copy.
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the stored document. The root must be an array of turn objects.
    fn parse(&self, content: &str) -> Result<History, HistoryError> {
        let malformed = |reason: String| HistoryError::Malformed {
            path: self.path.clone(),
            reason,
        };

        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| malformed(e.to_string()))?;

        if !value.is_array() {
            return Err(malformed("root is not a JSON array".into()));
        }

        serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
    }

    /// `memory/history.json` → `memory/.history.json.tmp`
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "history.json".into());
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    fn write_error(&self, reason: String) -> HistoryError {
        HistoryError::Write {
            path: self.path.clone(),
            reason,
        }
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> Result<History, HistoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No history file yet, starting empty");
                return Ok(History::new());
            }
            Err(e) => {
                return Err(HistoryError::Read {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        let history = self.parse(&content)?;
        debug!(path = %self.path.display(), turns = history.len(), "History loaded");
        Ok(history)
    }

    async fn save(&self, history: &History) -> Result<(), HistoryError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(format!("Failed to create directory: {e}")))?;
        }

        let json = serde_json::to_string_pretty(history)
            .map_err(|e| self.write_error(format!("Failed to serialize history: {e}")))?;

        let tmp = self.temp_path();
        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(json.as_bytes()).await?;
            file.write_all(b"\n").await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.write_error(e.to_string()));
        }

        debug!(path = %self.path.display(), turns = history.len(), "History saved");
        Ok(())
    }
}
