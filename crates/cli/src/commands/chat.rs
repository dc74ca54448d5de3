//! `deskmate chat` — Interactive terminal chat.

use std::sync::Arc;

use deskmate_agent::{CompletionInvoker, Session, SessionConfig};
use deskmate_channels::CliChannel;
use deskmate_config::AppConfig;
use deskmate_core::channel::{Channel, ChannelMessage};
use deskmate_core::error::ChannelError;
use deskmate_core::persona::Persona;
use deskmate_memory::{FileHistoryStore, FileTemplateStore};
use tokio::sync::mpsc;

/// Used when the operator leaves the business context blank.
pub const DEFAULT_BUSINESS_CONTEXT: &str = "Small business. No additional context provided.";

pub async fn run(
    context: Option<String>,
    role: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // The credential is checked before anything is asked of the user.
    if let Some(message) = super::missing_credential(&config) {
        eprintln!("{message}");
        return Ok(());
    }
    let provider =
        deskmate_providers::build_from_config(&config).map_err(|e| format!("ERROR: {e}"))?;

    let channel = CliChannel::new();
    let mut rx = channel.start().await?;

    channel.send("=== AI Business Assistant (CLI) ===").await?;
    channel.send("Type 'exit' or 'quit' to stop.\n").await?;

    let business_context = match context {
        Some(text) => resolve_business_context(&text),
        None => {
            channel.send("Step 1/2: Describe the business (context).").await?;
            channel
                .send("Include products, services, hours, policies, etc.")
                .await?;
            channel
                .send("Tip: keep it short during development to reduce cost.\n")
                .await?;
            channel.prompt("BUSINESS_CONTEXT").await?;
            resolve_business_context(&next_line(&mut rx).await?.unwrap_or_default())
        }
    };

    let persona = match role {
        Some(text) => Persona::parse_or_default(&text),
        None => {
            channel
                .send("\nStep 2/2: Choose role: sales / support / manager")
                .await?;
            channel.prompt("ROLE").await?;
            Persona::parse_or_default(&next_line(&mut rx).await?.unwrap_or_default())
        }
    };
    channel.send("").await?;

    let templates = FileTemplateStore::new(&config.paths.template);
    let store = Arc::new(FileHistoryStore::new(&config.paths.history));
    let invoker = CompletionInvoker::new(provider, config.model_params());
    let (session, state) = Session::start(&templates, store, invoker, config.max_turns_to_keep)
        .await
        .map_err(|e| format!("ERROR: {e}"))?;

    let session_config = SessionConfig::new(business_context, persona);
    tracing::info!(
        persona = %session_config.persona,
        turns = state.history.len(),
        "Chat started"
    );

    session
        .converse(&channel, &mut rx, state, &session_config)
        .await?;

    Ok(())
}

/// A blank context falls back to [`DEFAULT_BUSINESS_CONTEXT`].
pub fn resolve_business_context(raw: &str) -> String {
    let text = raw.trim();
    if text.is_empty() {
        DEFAULT_BUSINESS_CONTEXT.to_string()
    } else {
        text.to_string()
    }
}

async fn next_line(
    rx: &mut mpsc::Receiver<Result<ChannelMessage, ChannelError>>,
) -> Result<Option<String>, ChannelError> {
    match rx.recv().await {
        Some(Ok(msg)) => Ok(Some(msg.content)),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}
