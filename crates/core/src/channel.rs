//! Channel trait — the abstraction over chat transports.
//!
//! A Channel delivers inbound user messages and carries replies back.
//! Implementations handle platform-specific connection logic; the core only
//! sees `InboundMessage`s and reply text.

use async_trait::async_trait;
use thiserror::Error;

use crate::message::InboundMessage;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Message delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },

    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),
}

/// The core Channel trait.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g. "cli").
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    ///
    /// Returns a receiver that yields inbound messages. The implementation
    /// handles polling or connection management internally.
    async fn start(
        &self,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<InboundMessage, ChannelError>>,
        ChannelError,
    >;

    /// Send a reply to a user.
    async fn send(
        &self,
        recipient: &crate::message::UserId,
        content: &str,
    ) -> std::result::Result<(), ChannelError>;

    /// Stop the channel gracefully.
    async fn stop(&self) -> std::result::Result<(), ChannelError> {
        Ok(())
    }
}
