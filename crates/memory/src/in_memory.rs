//! In-memory history store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use deskmate_core::error::HistoryError;
use deskmate_core::store::HistoryStore;
use deskmate_core::turn::History;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A history store that keeps the last saved history in memory.
/// Useful for testing and sessions where persistence isn't needed.
#[derive(Clone, Default)]
pub struct InMemoryHistoryStore {
    history: Arc<RwLock<History>>,
    saves: Arc<RwLock<usize>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing history, as if it had been saved before.
    pub fn with_history(history: History) -> Self {
        Self {
            history: Arc::new(RwLock::new(history)),
            saves: Arc::new(RwLock::new(0)),
        }
    }

    /// A copy of what is currently stored.
    pub async fn snapshot(&self) -> History {
        self.history.read().await.clone()
    }

    /// How many times `save` has been called.
    pub async fn save_count(&self) -> usize {
        *self.saves.read().await
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn load(&self) -> Result<History, HistoryError> {
        Ok(self.history.read().await.clone())
    }

    async fn save(&self, history: &History) -> Result<(), HistoryError> {
        *self.history.write().await = history.clone();
        *self.saves.write().await += 1;
        Ok(())
    }
}
