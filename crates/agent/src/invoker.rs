//! Completion invoker — one model call per user message.

use deskmate_core::error::ProviderError;
use deskmate_core::message::Message;
use deskmate_core::provider::{ModelParams, Provider, ProviderRequest};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix of the text recorded in place of a reply when a call fails.
pub const ERROR_PREFIX: &str = "ERROR calling model:";

/// A failed model call. Carries a human-readable description only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{detail}")]
pub struct CompletionError {
    pub detail: String,
}

impl CompletionError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// The text shown to the user and stored as the `ai` turn.
    pub fn render(&self) -> String {
        format!("{ERROR_PREFIX} {}", self.detail)
    }
}

impl From<ProviderError> for CompletionError {
    fn from(e: ProviderError) -> Self {
        Self::new(e.to_string())
    }
}

/// Sends assembled messages to the provider with the run's fixed parameters.
pub struct CompletionInvoker {
    provider: Arc<dyn Provider>,
    params: ModelParams,
}

impl CompletionInvoker {
    pub fn new(provider: Arc<dyn Provider>, params: ModelParams) -> Self {
        Self { provider, params }
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Exactly one request per call; no retry.
    ///
    /// On success the reply text is returned with surrounding whitespace
    /// removed. Any failure (network, auth, rate limit, bad response) comes
    /// back as a [`CompletionError`].
    pub async fn invoke(&self, messages: Vec<Message>) -> Result<String, CompletionError> {
        let request = ProviderRequest::new(&self.params, messages);
        debug!(
            provider = self.provider.name(),
            model = %self.params.model,
            messages = request.messages.len(),
            "Calling model"
        );

        match self.provider.complete(request).await {
            Ok(response) => {
                if let Some(usage) = &response.usage {
                    debug!(
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        "Model replied"
                    );
                }
                Ok(response.message.content.trim().to_string())
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Model call failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingProvider, ScriptedProvider};

    #[tokio::test]
    async fn reply_is_trimmed() {
        let provider = Arc::new(ScriptedProvider::replies(&["\n  Hi there!  \n"]));
        let invoker = CompletionInvoker::new(provider.clone(), ModelParams::default());

        let reply = invoker.invoke(vec![Message::user("Hello")]).await.unwrap();
        assert_eq!(reply, "Hi there!");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn request_carries_fixed_params() {
        let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
        let params = ModelParams {
            model: "gpt-test".into(),
            temperature: 0.7,
            max_tokens: 99,
        };
        let invoker = CompletionInvoker::new(provider.clone(), params);
        invoker
            .invoke(vec![Message::system("s"), Message::user("u")])
            .await
            .unwrap();

        let request = provider.last_request().unwrap();
        assert_eq!(request.model, "gpt-test");
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, Some(99));
        assert_eq!(request.messages.len(), 2);
    }

    #[tokio::test]
    async fn provider_failure_becomes_completion_error() {
        let provider = Arc::new(FailingProvider::new(ProviderError::AuthenticationFailed(
            "invalid api key".into(),
        )));
        let invoker = CompletionInvoker::new(provider.clone(), ModelParams::default());

        let err = invoker.invoke(vec![Message::user("Hi")]).await.unwrap_err();
        assert!(err.detail.contains("invalid api key"));
        assert!(err.render().starts_with("ERROR calling model: "));
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn render_format() {
        let err = CompletionError::new("connection refused");
        assert_eq!(err.render(), "ERROR calling model: connection refused");
    }
}
