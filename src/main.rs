//! NASA Astronomy Bot - Main Entry Point
//!
//! A Telegram bot that relays NASA open data and broadcasts the Astronomy
//! Picture of the Day to subscribers.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use nasa_astro_bot::api::ApiClient;
use nasa_astro_bot::commands::CommandHandler;
use nasa_astro_bot::config::{BotSettings, Credentials};
use nasa_astro_bot::scheduler::{DailyBroadcaster, SchedulerMessage};
use nasa_astro_bot::server::{self, POLL_TIMEOUT_SECS};
use nasa_astro_bot::subscribers::SubscriberRegistry;
use nasa_astro_bot::telegram::{Messenger, TelegramBot};
use nasa_astro_bot::translate::GoogleTranslator;

/// Telegram bot relaying NASA astronomy data.
#[derive(Parser, Debug)]
#[command(name = "astro_bot")]
#[command(about = "Telegram bot for NASA APOD, asteroids, Mars photos, space weather and the ISS")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Use long polling even if WEBHOOK_URL is set.
    #[arg(long)]
    polling: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configurations
    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("{}", e);
            return Err(e).context("Failed to load credentials from environment");
        }
    };
    debug!("Loaded {:?}", credentials);

    let settings = BotSettings::from_env_with_defaults();

    let http = reqwest::Client::builder()
        .user_agent(concat!("nasa_astro_bot/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let bot = Arc::new(TelegramBot::new(http.clone(), &credentials.bot_token));
    let feeds = Arc::new(ApiClient::new(http.clone(), credentials.nasa_api_key.clone()));
    let subscribers = Arc::new(SubscriberRegistry::new());

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            info!(
                "Authorized as @{} (id {})",
                me.username.as_deref().unwrap_or("?"),
                me.id
            );
            me.username
        }
        Err(e) => {
            warn!("getMe failed, bot username unknown: {}", e);
            None
        }
    };

    let mut handler = CommandHandler::new(
        Arc::clone(&bot) as Arc<dyn Messenger>,
        feeds,
        Arc::clone(&subscribers),
    )
    .with_bot_username(bot_username)
    .with_display_offset(settings.display_offset())
    .with_broadcast_time(settings.broadcast_time);

    if let Some(target) = &settings.translate_target {
        let translator = GoogleTranslator::new(http.clone(), target.clone());
        info!("Translating APOD explanations to {}", translator.target());
        handler = handler.with_translator(Arc::new(translator));
    }
    let handler = Arc::new(handler);

    // Register the inbound transport before anything starts running
    let webhook_base = settings.webhook_url.as_deref().filter(|_| !args.polling);
    match webhook_base {
        Some(base) => {
            bot.set_webhook(&format!("{}/{}", base, credentials.bot_token))
                .await
                .context("Failed to register webhook")?;
        }
        None => {
            if let Err(e) = bot.delete_webhook().await {
                warn!("Failed to delete webhook before polling: {}", e);
            }
        }
    }

    // Create scheduler channel
    let (scheduler_tx, scheduler_rx) = mpsc::channel::<SchedulerMessage>(8);

    let scheduler = DailyBroadcaster::new(Arc::clone(&handler), settings.broadcast_time);

    info!(
        "Starting astronomy bot (daily broadcast at {})",
        settings.broadcast_time
    );

    // Spawn scheduler task
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(scheduler_rx).await;
    });

    match webhook_base {
        Some(base) => {
            info!("Webhook mode: {}/<token> on port {}", base, settings.port);
            server::serve(
                Arc::clone(&handler),
                &credentials.bot_token,
                settings.port,
                shutdown_signal(),
            )
            .await
            .context("Webhook server failed")?;
        }
        None => {
            info!("Polling mode. Use Ctrl+C to stop.");
            server::run_polling(&bot, &handler, POLL_TIMEOUT_SECS, shutdown_signal()).await;
        }
    }

    // Cleanup
    info!("Shutting down...");
    let _ = scheduler_tx.send(SchedulerMessage::Shutdown).await;
    let _ = scheduler_handle.await;

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down...");
}
