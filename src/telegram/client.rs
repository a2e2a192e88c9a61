//! Telegram Bot API client over HTTPS.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::Messenger;
use super::message::{Content, Outgoing};
use super::types::{ApiResponse, BotUser, ChatId, InlineKeyboardMarkup, Update};

const TELEGRAM_API_ROOT: &str = "https://api.telegram.org";
const CALL_TIMEOUT: Duration = Duration::from_secs(15);

/// Slack added on top of the long-poll timeout for the HTTP request itself.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Errors that can occur while talking to the Bot API.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Bot API request failed: {0}")]
    Http(reqwest::Error),

    #[error("{method} rejected ({code}): {description}")]
    Api {
        method: &'static str,
        code: i64,
        description: String,
    },

    #[error("Flood wait required: {0} seconds")]
    FloodWait(u64),

    #[error("{0} returned ok without a result")]
    MissingResult(&'static str),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL embeds the bot token.
        Self::Http(err.without_url())
    }
}

/// Bot API client bound to one bot token.
#[derive(Clone)]
pub struct TelegramBot {
    http: reqwest::Client,
    api_base: String,
}

impl TelegramBot {
    #[must_use]
    pub fn new(http: reqwest::Client, token: &str) -> Self {
        Self::with_api_root(http, TELEGRAM_API_ROOT, token)
    }

    /// Points the client at a different Bot API server.
    #[must_use]
    pub fn with_api_root(http: reqwest::Client, root: &str, token: &str) -> Self {
        Self {
            http,
            api_base: format!("{}/bot{}", root.trim_end_matches('/'), token),
        }
    }

    async fn call<P, R>(
        &self,
        method: &'static str,
        payload: &P,
        timeout: Duration,
    ) -> Result<R, TransportError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.api_base, method);
        let response = self
            .http
            .post(url)
            .json(payload)
            .timeout(timeout)
            .send()
            .await?;

        // Error responses carry a JSON envelope too, so the status is not checked.
        let envelope: ApiResponse<R> = response.json().await?;
        if envelope.ok {
            return envelope.result.ok_or(TransportError::MissingResult(method));
        }

        if let Some(seconds) = envelope.parameters.and_then(|p| p.retry_after) {
            warn!("{} hit flood control: retry after {}s", method, seconds);
            return Err(TransportError::FloodWait(seconds));
        }

        Err(TransportError::Api {
            method,
            code: envelope.error_code.unwrap_or_default(),
            description: envelope
                .description
                .unwrap_or_else(|| "no description".to_owned()),
        })
    }

    /// Returns the bot's own account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    pub async fn get_me(&self) -> Result<BotUser, TransportError> {
        self.call("getMe", &serde_json::json!({}), CALL_TIMEOUT).await
    }

    /// Sends a text message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Telegram rejects it.
    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markdown: bool,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        debug!("sendMessage to {}: \"{}\"", chat_id, truncate_for_log(text, 40));

        let mut payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        decorate(&mut payload, markdown, keyboard);

        let _: IgnoredAny = self.call("sendMessage", &payload, CALL_TIMEOUT).await?;
        Ok(())
    }

    /// Sends a photo by URL with a caption.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Telegram rejects it (for
    /// example when it cannot fetch the photo URL).
    pub async fn send_photo(
        &self,
        chat_id: ChatId,
        photo_url: &str,
        caption: &str,
        markdown: bool,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        debug!("sendPhoto to {}: {}", chat_id, photo_url);

        let mut payload = serde_json::json!({
            "chat_id": chat_id,
            "photo": photo_url,
            "caption": caption,
        });
        decorate(&mut payload, markdown, keyboard);

        let _: IgnoredAny = self.call("sendPhoto", &payload, CALL_TIMEOUT).await?;
        Ok(())
    }

    /// Stops the loading indicator on a pressed inline button.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the query expired.
    pub async fn answer_callback_query(&self, callback_id: &str) -> Result<(), TransportError> {
        let payload = serde_json::json!({ "callback_query_id": callback_id });
        let _: bool = self.call("answerCallbackQuery", &payload, CALL_TIMEOUT).await?;
        Ok(())
    }

    /// Registers `url` as the webhook for message and callback updates.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Telegram rejects the URL.
    pub async fn set_webhook(&self, url: &str) -> Result<(), TransportError> {
        let payload = serde_json::json!({
            "url": url,
            "allowed_updates": ["message", "callback_query"],
        });
        let _: bool = self.call("setWebhook", &payload, CALL_TIMEOUT).await?;
        info!("Webhook registered");
        Ok(())
    }

    /// Removes any registered webhook so `getUpdates` can be used.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_webhook(&self) -> Result<(), TransportError> {
        let _: bool = self
            .call("deleteWebhook", &serde_json::json!({}), CALL_TIMEOUT)
            .await?;
        Ok(())
    }

    /// Long-polls for updates after `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or times out.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let payload = serde_json::json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        self.call(
            "getUpdates",
            &payload,
            Duration::from_secs(timeout_secs) + POLL_GRACE,
        )
        .await
    }
}

fn decorate(
    payload: &mut serde_json::Value,
    markdown: bool,
    keyboard: Option<&InlineKeyboardMarkup>,
) {
    if markdown {
        payload["parse_mode"] = serde_json::Value::from("Markdown");
    }
    if let Some(keyboard) = keyboard
        && let Ok(markup) = serde_json::to_value(keyboard)
    {
        payload["reply_markup"] = markup;
    }
}

#[async_trait]
impl Messenger for TelegramBot {
    async fn deliver(&self, chat_id: ChatId, message: &Outgoing) -> Result<(), TransportError> {
        let keyboard = message.keyboard.as_ref();
        match &message.content {
            Content::Text(text) => {
                self.send_message(chat_id, text, message.markdown, keyboard)
                    .await
            }
            Content::Photo { url, caption } => {
                self.send_photo(chat_id, url, caption, message.markdown, keyboard)
                    .await
            }
        }
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError> {
        self.answer_callback_query(callback_id).await
    }
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot").finish_non_exhaustive()
    }
}

/// Truncates a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}
