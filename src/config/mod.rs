//! Configuration module for the astronomy bot.
//!
//! Handles loading of the required API credentials and the optional
//! runtime settings from environment variables.

mod settings;

pub use settings::{BotSettings, ConfigError, Credentials};
