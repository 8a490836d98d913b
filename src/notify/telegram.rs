//! Telegram Bot API delivery
//!
//! Delivery is best-effort: each message or chunk gets exactly one request,
//! failures are logged and never surfaced to the caller.

use crate::config::{Config, TelegramCredentials, TELEGRAM_TOKEN_VAR};
use crate::notify::format::{escape_markdown, split_message, LinkButton, NotificationMessage};
use crate::{ConfigError, RelayError};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Timeout for a single sendMessage call
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Parse mode matching the escaping done by [`escape_markdown`]
pub const PARSE_MODE: &str = "MarkdownV2";

/// Request body of the sendMessage method
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup<'a>>,
}

#[derive(Debug, Serialize)]
struct ReplyMarkup<'a> {
    inline_keyboard: Vec<Vec<&'a LinkButton>>,
}

impl<'a> ReplyMarkup<'a> {
    fn single(button: &'a LinkButton) -> Self {
        Self {
            inline_keyboard: vec![vec![button]],
        }
    }
}

/// Where messages go once notifications are enabled
struct Destination {
    endpoint: Url,
    /// Endpoint with the bot token masked, safe for logs
    display: String,
    chat_id: String,
}

/// Delivers notification messages to a Telegram chat
pub struct TelegramNotifier {
    client: Client,
    destination: Option<Destination>,
    timeout: Duration,
}

impl TelegramNotifier {
    /// Creates a notifier from the configuration and secrets
    ///
    /// # Returns
    ///
    /// * `Ok(TelegramNotifier)` - A live notifier, or a no-op one when `telegram_enabled` is false
    /// * `Err(RelayError)` - Notifications are enabled but credentials are missing or the API URL is unusable
    pub fn new(
        client: Client,
        config: &Config,
        credentials: Option<TelegramCredentials>,
    ) -> Result<Self, RelayError> {
        if !config.telegram_enabled {
            return Ok(Self::disabled(client));
        }

        let credentials = credentials.ok_or(ConfigError::MissingSecret(TELEGRAM_TOKEN_VAR))?;
        let base = Url::parse(&config.telegram_api_url)?;

        let mut endpoint = base.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| {
                ConfigError::InvalidUrl(format!(
                    "telegram_api_url cannot be a base URL: {}",
                    config.telegram_api_url
                ))
            })?
            .pop_if_empty()
            .push(&format!("bot{}", credentials.token))
            .push("sendMessage");

        let display = format!(
            "{}/bot<redacted>/sendMessage",
            base.as_str().trim_end_matches('/')
        );

        Ok(Self {
            client,
            destination: Some(Destination {
                endpoint,
                display,
                chat_id: credentials.chat_id,
            }),
            timeout: SEND_TIMEOUT,
        })
    }

    /// Creates a notifier that never sends anything
    pub fn disabled(client: Client) -> Self {
        Self {
            client,
            destination: None,
            timeout: SEND_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.destination.is_some()
    }

    /// Sends a message, splitting it when it exceeds Telegram's size limit
    ///
    /// The link button is attached only when the message fits in a single
    /// request; split messages are sent without it. Never fails: delivery
    /// errors are logged and dropped.
    pub async fn notify(&self, message: &NotificationMessage) {
        let Some(destination) = &self.destination else {
            tracing::trace!("Notifications disabled, skipping message");
            return;
        };

        let text = escape_markdown(&message.text);
        let chunks = split_message(&text);

        if let [single] = chunks.as_slice() {
            let payload = SendMessage {
                chat_id: &destination.chat_id,
                text: single,
                parse_mode: PARSE_MODE,
                reply_markup: message.link.as_ref().map(ReplyMarkup::single),
            };
            self.deliver_logged(destination, &payload).await;
            return;
        }

        tracing::debug!(
            "Message of {} characters split into {} chunks",
            text.chars().count(),
            chunks.len()
        );

        for (index, chunk) in chunks.iter().enumerate() {
            let payload = SendMessage {
                chat_id: &destination.chat_id,
                text: chunk,
                parse_mode: PARSE_MODE,
                reply_markup: None,
            };
            tracing::trace!("Sending chunk {}/{}", index + 1, chunks.len());
            self.deliver_logged(destination, &payload).await;
        }
    }

    async fn deliver_logged(&self, destination: &Destination, payload: &SendMessage<'_>) {
        if let Err(e) = self.deliver(destination, payload).await {
            tracing::warn!("Telegram delivery failed: {}", e);
        }
    }

    /// Performs one sendMessage call
    async fn deliver(
        &self,
        destination: &Destination,
        payload: &SendMessage<'_>,
    ) -> Result<(), RelayError> {
        let response = self
            .client
            .post(destination.endpoint.clone())
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            // reqwest errors carry the request URL, which embeds the bot token
            .map_err(|e| RelayError::from_transport(&destination.display, e.without_url()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Telegram {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Delivered message to {}", destination.display);
        Ok(())
    }
}
