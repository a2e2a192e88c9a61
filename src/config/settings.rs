//! Application settings and API credentials.

use std::fmt;

use chrono::{FixedOffset, Offset, Utc};
use tracing::warn;

use crate::scheduler::DailyTime;

/// Secrets the bot cannot start without.
#[derive(Clone)]
pub struct Credentials {
    /// Telegram bot token (obtain from @BotFather).
    pub bot_token: String,

    /// NASA open API key (obtain from <https://api.nasa.gov>).
    pub nasa_api_key: String,
}

impl Credentials {
    /// Creates credentials from explicit values.
    #[must_use]
    pub fn new(bot_token: impl Into<String>, nasa_api_key: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            nasa_api_key: nasa_api_key.into(),
        }
    }

    /// Creates credentials from environment variables.
    ///
    /// Expects `BOT_TOKEN` and `NASA_API_KEY` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is missing or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates credentials from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if either key is missing or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = required(&lookup, "BOT_TOKEN")?;
        let nasa_api_key = required(&lookup, "NASA_API_KEY")?;

        Ok(Self {
            bot_token,
            nasa_api_key,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &mask_secret(&self.bot_token))
            .field("nasa_api_key", &mask_secret(&self.nasa_api_key))
            .finish()
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingEnvVar(key))
}

/// Bot-specific settings. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    /// Public base URL; when set, the bot runs in webhook mode.
    pub webhook_url: Option<String>,

    /// Port the webhook server listens on.
    pub port: u16,

    /// Target language for APOD explanations. `None` disables translation.
    pub translate_target: Option<String>,

    /// UTC time of the daily APOD broadcast.
    pub broadcast_time: DailyTime,

    /// Offset (hours from UTC) used for local times in the storm report.
    pub display_offset_hours: i32,
}

const DEFAULT_PORT: u16 = 8443;
const DEFAULT_DISPLAY_OFFSET_HOURS: i32 = 8;

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            port: DEFAULT_PORT,
            translate_target: None,
            broadcast_time: DailyTime::default(),
            display_offset_hours: DEFAULT_DISPLAY_OFFSET_HOURS,
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates bot settings from an arbitrary key lookup.
    ///
    /// Invalid values are logged and replaced by their defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let webhook_url = optional("WEBHOOK_URL").map(|url| url.trim_end_matches('/').to_owned());

        let port = optional("PORT").map_or(DEFAULT_PORT, |raw| {
            raw.parse().unwrap_or_else(|_| {
                warn!("Invalid PORT '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            })
        });

        let broadcast_time = optional("DAILY_BROADCAST_UTC").map_or_else(DailyTime::default, |raw| {
            raw.parse().unwrap_or_else(|e| {
                warn!("Invalid DAILY_BROADCAST_UTC '{}' ({}), using default", raw, e);
                DailyTime::default()
            })
        });

        let display_offset_hours = optional("DISPLAY_UTC_OFFSET_HOURS").map_or(
            DEFAULT_DISPLAY_OFFSET_HOURS,
            |raw| match raw.parse::<i32>() {
                Ok(hours) if (-12..=14).contains(&hours) => hours,
                _ => {
                    warn!(
                        "Invalid DISPLAY_UTC_OFFSET_HOURS '{}', using {}",
                        raw, DEFAULT_DISPLAY_OFFSET_HOURS
                    );
                    DEFAULT_DISPLAY_OFFSET_HOURS
                }
            },
        );

        Self {
            webhook_url,
            port,
            translate_target: optional("TRANSLATE_TARGET"),
            broadcast_time,
            display_offset_hours,
        }
    }

    /// The display offset as a chrono offset.
    #[must_use]
    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.display_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
}

/// Masks a secret for logging (shows last 4 characters).
fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count > 8 {
        let tail: String = secret.chars().skip(count - 4).collect();
        format!("***{tail}")
    } else {
        "****".to_owned()
    }
}
