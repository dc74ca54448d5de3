//! Storage traits — where the turn log and the prompt template live.
//!
//! Implementations: a JSON file and an in-memory store for the history; a
//! text file and a fixed string for the template.

use async_trait::async_trait;
use crate::error::{HistoryError, TemplateError};
use crate::turn::History;

/// Durable home of the conversation [`History`].
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// The backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Read the persisted history.
    ///
    /// A store that has never been written returns an empty history, not an
    /// error. Unreadable or malformed data is reported as an error so the
    /// caller can decide how forgiving to be.
    async fn load(&self) -> std::result::Result<History, HistoryError>;

    /// Replace the persisted history with `history` (the full log, not a delta).
    async fn save(&self, history: &History) -> std::result::Result<(), HistoryError>;

    /// Reset the persisted history to empty.
    async fn clear(&self) -> std::result::Result<(), HistoryError> {
        self.save(&History::new()).await
    }
}

/// Source of the base system prompt.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Return the template text with surrounding whitespace stripped.
    async fn load_template(&self) -> std::result::Result<String, TemplateError>;
}
