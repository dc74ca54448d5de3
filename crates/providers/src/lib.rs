//! LLM Provider implementations for Deskmate.
//!
//! All providers implement the `deskmate_core::Provider` trait.
//! [`build_from_config`] picks the provider for a loaded configuration.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use deskmate_config::{AppConfig, ConfigError};
use deskmate_core::Provider;
use deskmate_core::error::ProviderError;
use std::sync::Arc;

/// Build the configured provider.
///
/// Fails with [`ConfigError::MissingApiKey`] when no credential is set; this
/// is checked before any session starts.
pub fn build_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn Provider>, ProviderSetupError> {
    let api_key = config.require_api_key()?;
    let provider = OpenAiCompatProvider::new("openai", &config.api_url, api_key)
        .with_timeout(std::time::Duration::from_secs(config.request_timeout_secs))?;
    tracing::debug!(
        provider = provider.name(),
        base_url = provider.base_url(),
        "Provider configured"
    );
    Ok(Arc::new(provider))
}

/// Why a provider could not be built.
#[derive(Debug, thiserror::Error)]
pub enum ProviderSetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
