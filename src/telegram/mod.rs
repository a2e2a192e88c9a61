//! Telegram transport.
//!
//! Bot API wire types, the HTTPS client, and the [`Messenger`] seam the
//! dispatcher and the broadcaster send through.

mod client;
mod message;
mod rate_limiter;
mod types;

use async_trait::async_trait;

pub use client::{TelegramBot, TransportError};
pub use message::{CAPTION_LIMIT, Content, Outgoing};
pub use rate_limiter::RateLimiter;
pub use types::{
    BotUser, CallbackQuery, Chat, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, Message,
    Update,
};

/// Delivers messages to chats.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends one message to `chat_id`.
    async fn deliver(&self, chat_id: ChatId, message: &Outgoing) -> Result<(), TransportError>;

    /// Acknowledges a button press.
    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError>;
}
