//! Telegram channel — long-polls the Bot API for updates.
//!
//! Implements the `Channel` trait directly against the HTTP Bot API:
//! `getUpdates` for inbound text, `sendMessage` for replies. When a reply
//! asks for the menu, the fixed three-button reply keyboard is attached.

use async_trait::async_trait;

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse};
use crate::error::ChannelError;

/// Long-poll timeout passed to `getUpdates`, in seconds.
const POLL_TIMEOUT_SECS: u32 = 30;

/// Telegram channel — connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.bot_token)
    }

    /// Send a text message, attaching the command keyboard when asked.
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        show_menu: bool,
    ) -> Result<(), ChannelError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if show_menu {
            body["reply_markup"] = menu_keyboard();
        }

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!("sendMessage returned {status}: {err}"),
            });
        }

        Ok(())
    }
}

/// The fixed reply keyboard shown with menu replies.
fn menu_keyboard() -> serde_json::Value {
    serde_json::json!({
        "keyboard": [["/reto", "/puntos"], ["/salir"]],
        "resize_keyboard": true
    })
}

/// Convert one `getUpdates` entry into an `IncomingMessage`, if it carries
/// a usable text message.
fn parse_update(update: &serde_json::Value) -> Option<IncomingMessage> {
    let message = update.get("message")?;
    let text = message.get("text").and_then(serde_json::Value::as_str)?;

    let from = message.get("from")?;
    let user_id = from.get("id").and_then(serde_json::Value::as_i64)?.to_string();
    let first_name = from
        .get("first_name")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(&user_id);

    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(serde_json::Value::as_i64)
        .map(|id| id.to_string())
        .unwrap_or_else(|| user_id.clone());

    Some(
        IncomingMessage::new("telegram", &user_id, text)
            .with_user_name(first_name)
            .with_metadata(serde_json::json!({ "chat_id": chat_id })),
    )
}

// ── Channel trait implementation ────────────────────────────────────

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let bot_token = self.bot_token.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for messages...");

            loop {
                let url = format!("https://api.telegram.org/bot{bot_token}/getUpdates");
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": POLL_TIMEOUT_SECS,
                    "allowed_updates": ["message"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                if let Some(results) = data.get("result").and_then(serde_json::Value::as_array) {
                    for update in results {
                        // Advance offset past this update
                        if let Some(uid) =
                            update.get("update_id").and_then(serde_json::Value::as_i64)
                        {
                            offset = uid + 1;
                        }

                        let Some(incoming) = parse_update(update) else {
                            continue;
                        };

                        if tx.send(incoming).is_err() {
                            tracing::info!("Telegram listener channel closed");
                            return;
                        }
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let chat_id = msg
            .metadata
            .get("chat_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: "No chat_id in message metadata".into(),
            })?;

        self.send_message(chat_id, &response.text, response.show_menu)
            .await
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("Telegram channel shutting down");
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────
