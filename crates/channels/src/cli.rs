//! CLI channel — interactive terminal-based chat.
//!
//! Reads lines from stdin, writes to stdout. Every line is forwarded
//! exactly as typed (empty lines included); the session loop decides what
//! the input means. The receiver closes on end of input.

use async_trait::async_trait;
use deskmate_core::channel::{Channel, ChannelId, ChannelMessage};
use deskmate_core::error::ChannelError;
use std::sync::Mutex;
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

type Input = Box<dyn AsyncRead + Unpin + Send>;
type Output = Box<dyn AsyncWrite + Unpin + Send>;

/// Interactive CLI channel for terminal-based chat.
pub struct CliChannel {
    id: ChannelId,
    input: Mutex<Option<Input>>,
    output: tokio::sync::Mutex<Output>,
}

impl CliChannel {
    /// A channel over the process's stdin and stdout.
    pub fn new() -> Self {
        Self::with_io(io::stdin(), io::stdout())
    }

    /// A channel over arbitrary streams.
    pub fn with_io<R, W>(input: R, output: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self {
            id: ChannelId("cli".into()),
            input: Mutex::new(Some(Box::new(input))),
            output: tokio::sync::Mutex::new(Box::new(output)),
        }
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), ChannelError> {
        let mut out = self.output.lock().await;
        let written = async {
            out.write_all(bytes).await?;
            out.flush().await
        }
        .await;
        written.map_err(|e| ChannelError::DeliveryFailed {
            channel: "cli".into(),
            reason: e.to_string(),
        })
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    fn id(&self) -> &ChannelId {
        &self.id
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let input = self
            .input
            .lock()
            .map_err(|_| ChannelError::NotConfigured("cli input lock poisoned".into()))?
            .take()
            .ok_or_else(|| ChannelError::NotConfigured("cli channel already started".into()))?;

        let (tx, rx) = mpsc::channel(32);
        let channel_id = self.id.clone();

        tokio::spawn(async move {
            let mut lines = BufReader::new(input).lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let msg = ChannelMessage {
                            channel_id: channel_id.clone(),
                            sender_id: "local_user".into(),
                            content: line,
                        };

                        if tx.send(Ok(msg)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("CLI input closed");
                        break;
                    }
                    Err(e) => {
                        let _ = tx.send(Err(ChannelError::ConnectionLost(e.to_string()))).await;
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, content: &str) -> Result<(), ChannelError> {
        self.write(format!("{content}\n").as_bytes()).await
    }

    /// Print `LABEL> ` without a newline and flush it.
    async fn prompt(&self, label: &str) -> Result<(), ChannelError> {
        self.write(format!("{label}> ").as_bytes()).await
    }
}
