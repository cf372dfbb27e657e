//! Channel trait and message types.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;

/// Stream of inbound messages produced by a running channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// An inbound text event from a user.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Channel name ("telegram", "cli").
    pub channel: String,
    /// Channel-native stable user identifier.
    pub user_id: String,
    /// Display name for profile creation.
    pub user_name: String,
    /// Raw message text.
    pub text: String,
    /// Whether the text is a `/command`.
    pub is_command: bool,
    /// Normalized command name (lowercased, bot mention stripped), if any.
    pub command_name: Option<String>,
    /// Channel-specific routing data (e.g. Telegram chat_id).
    pub metadata: serde_json::Value,
}

impl IncomingMessage {
    /// Build a message, detecting the command form from the text.
    pub fn new(channel: &str, user_id: &str, text: &str) -> Self {
        let trimmed = text.trim();
        let is_command = trimmed.starts_with('/');
        let command_name = is_command.then(|| {
            let first = trimmed.split_whitespace().next().unwrap_or(trimmed);
            // Telegram group mentions look like "/reto@LumoBot".
            first
                .split('@')
                .next()
                .unwrap_or(first)
                .to_lowercase()
        });

        Self {
            channel: channel.to_string(),
            user_id: user_id.to_string(),
            user_name: user_id.to_string(),
            text: text.to_string(),
            is_command,
            command_name,
            metadata: serde_json::json!({}),
        }
    }

    pub fn with_user_name(mut self, name: &str) -> Self {
        self.user_name = name.to_string();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// An outbound reply.
#[derive(Debug, Clone)]
pub struct OutgoingResponse {
    pub text: String,
    /// Attach the fixed three-button command keyboard.
    pub show_menu: bool,
}

impl OutgoingResponse {
    pub fn new(text: impl Into<String>, show_menu: bool) -> Self {
        Self {
            text: text.into(),
            show_menu,
        }
    }
}

/// A transport binding: produces inbound messages and delivers replies.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name for logging.
    fn name(&self) -> &str;

    /// Start listening; returns the stream of inbound messages.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Deliver a reply to the user who sent `msg`.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    /// Verify the channel can reach its transport.
    async fn health_check(&self) -> Result<(), ChannelError>;

    /// Graceful shutdown.
    async fn shutdown(&self) -> Result<(), ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        let msg = IncomingMessage::new("cli", "u1", "hoy me siento bien");
        assert!(!msg.is_command);
        assert_eq!(msg.command_name, None);
    }

    #[test]
    fn slash_prefix_is_detected_as_command() {
        let msg = IncomingMessage::new("telegram", "u1", "/reto");
        assert!(msg.is_command);
        assert_eq!(msg.command_name.as_deref(), Some("/reto"));
    }

    #[test]
    fn command_name_is_lowercased_and_mention_stripped() {
        let msg = IncomingMessage::new("telegram", "u1", "/Reto@LumoBot extra");
        assert_eq!(msg.command_name.as_deref(), Some("/reto"));
    }

    #[test]
    fn unknown_command_still_flagged_as_command() {
        let msg = IncomingMessage::new("telegram", "u1", "/ret");
        assert!(msg.is_command);
        assert_eq!(msg.command_name.as_deref(), Some("/ret"));
    }

    #[test]
    fn builder_sets_name_and_metadata() {
        let msg = IncomingMessage::new("telegram", "42", "hola")
            .with_user_name("Ana")
            .with_metadata(serde_json::json!({"chat_id": "99"}));
        assert_eq!(msg.user_name, "Ana");
        assert_eq!(
            msg.metadata.get("chat_id").and_then(|v| v.as_str()),
            Some("99")
        );
    }
}
