//! Channel trait — the abstraction over chat front-ends.
//!
//! A Channel delivers raw user input to the session and displays replies.
//! It does not interpret the input: deciding what is a termination token or
//! an empty line belongs to the session loop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ChannelError;

/// Unique identifier for a channel instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A line of input received from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// The channel this message belongs to
    pub channel_id: ChannelId,

    /// Sender identifier (platform-specific user ID)
    pub sender_id: String,

    /// The text content, exactly as received
    pub content: String,
}

#[async_trait]
pub trait Channel: Send + Sync {
    /// The channel name (e.g., "cli").
    fn name(&self) -> &str;

    fn id(&self) -> &ChannelId;

    /// Start receiving input. The receiver closes when the front-end
    /// shuts down (EOF, disconnect).
    async fn start(
        &self,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError>;

    /// Display text to the user.
    async fn send(&self, content: &str) -> Result<(), ChannelError>;

    /// Ask for the next line of input. Channels without a prompt ignore it.
    async fn prompt(&self, _label: &str) -> Result<(), ChannelError> {
        Ok(())
    }
}
