//! CLI channel — interactive terminal-based chat.
//!
//! The simplest transport: one line on stdin is one direct message from the
//! local user, replies go to stdout. Used by `cascata chat`.

use async_trait::async_trait;
use cascata_core::channel::{Channel, ChannelError};
use cascata_core::message::{InboundMessage, UserId};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Identity assumed for everything typed into the terminal.
pub const LOCAL_USER: &str = "local_user";

pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
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

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<InboundMessage, ChannelError>>, ChannelError> {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let stdin = io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }

                        if matches!(line.as_str(), "exit" | "quit" | "/exit" | "/quit" | ":q") {
                            break;
                        }

                        if tx
                            .send(Ok(InboundMessage::direct(LOCAL_USER, &line)))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF (Ctrl+D)
                    Err(e) => {
                        let _ = tx
                            .send(Err(ChannelError::ConnectionLost(e.to_string())))
                            .await;
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, _recipient: &UserId, content: &str) -> Result<(), ChannelError> {
        println!("{content}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_channel_properties() {
        let ch = CliChannel::new();
        assert_eq!(ch.name(), "cli");
    }

    #[tokio::test]
    async fn send_never_fails() {
        let ch = CliChannel::new();
        assert!(ch.send(&UserId::new(LOCAL_USER), "olá").await.is_ok());
    }
}
