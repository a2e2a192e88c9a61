//! Command handling module.
//!
//! Parses slash commands and menu button presses and runs their handlers.

mod handler;
mod types;

pub use handler::{ActionError, CommandHandler, PHOTO_INTERVAL, ROVER_PHOTO_LIMIT};
pub use types::{ApodRequest, BotCommand, MenuAction};
