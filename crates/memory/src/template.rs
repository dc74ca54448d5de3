//! System prompt template sources.

use async_trait::async_trait;
use deskmate_core::error::TemplateError;
use deskmate_core::store::TemplateStore;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Built-in text a front-end may use when the template file is unavailable.
/// The CLI never uses it; a missing template there is fatal.
pub const FALLBACK_TEMPLATE: &str = "You are an AI Business Assistant for a small business.";

/// Reads the template from a UTF-8 text file on every call.
pub struct FileTemplateStore {
    path: PathBuf,
}

impl FileTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TemplateStore for FileTemplateStore {
    async fn load_template(&self) -> Result<String, TemplateError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| TemplateError::Unavailable {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        debug!(path = %self.path.display(), chars = raw.len(), "Template loaded");
        Ok(raw.trim().to_string())
    }
}

/// A template fixed in memory.
#[derive(Debug, Clone)]
pub struct StaticTemplate(pub String);

impl StaticTemplate {
    pub fn fallback() -> Self {
        Self(FALLBACK_TEMPLATE.to_string())
    }
}

#[async_trait]
impl TemplateStore for StaticTemplate {
    async fn load_template(&self) -> Result<String, TemplateError> {
        Ok(self.0.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_template_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("system_prompt.txt");
        std::fs::write(&path, "\n\n  You are a helpful shop assistant.\n\n").unwrap();

        let store = FileTemplateStore::new(&path);
        assert_eq!(
            store.load_template().await.unwrap(),
            "You are a helpful shop assistant."
        );
    }

    #[tokio::test]
    async fn missing_template_is_unavailable() {
        let store = FileTemplateStore::new("/nonexistent/prompts/system_prompt.txt");
        let err = store.load_template().await.unwrap_err();
        assert!(matches!(err, TemplateError::Unavailable { .. }));
        assert!(err.to_string().contains("system_prompt.txt"));
    }

    #[tokio::test]
    async fn static_fallback_text() {
        let store = StaticTemplate::fallback();
        assert_eq!(store.load_template().await.unwrap(), FALLBACK_TEMPLATE);
    }
}
