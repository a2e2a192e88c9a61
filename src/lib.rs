//! NASA Astronomy Bot Library
//!
//! A Telegram bot relaying NASA open data: the Astronomy Picture of the Day,
//! near-Earth asteroids, Mars rover photos, EPIC Earth images, DONKI space
//! weather and the ISS position.
//!
//! This crate provides the core functionality for:
//! - Fetching and decoding the vendor APIs
//! - Rendering records into Telegram messages
//! - Dispatching commands and menu buttons
//! - Broadcasting the APOD to subscribers every day
//! - Receiving updates via webhook or long polling

pub mod api;
pub mod astro;
pub mod commands;
pub mod config;
pub mod format;
pub mod scheduler;
pub mod server;
pub mod subscribers;
pub mod telegram;
pub mod translate;

#[cfg(test)]
mod testing;
