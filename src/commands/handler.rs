//! Command and menu dispatcher.

use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::types::{ApodRequest, BotCommand, MenuAction};
use crate::api::{RemoteFetchError, SpaceFeeds, newest_photos};
use crate::astro::{is_valid_apod_date, moon_phase, random_apod_date, random_fact};
use crate::format;
use crate::scheduler::DailyTime;
use crate::subscribers::SubscriberRegistry;
use crate::telegram::{CallbackQuery, ChatId, Messenger, Outgoing, RateLimiter, TransportError, Update};
use crate::translate::{Translator, translate_or_original};

/// Number of rover photos sent per request.
pub const ROVER_PHOTO_LIMIT: usize = 3;

/// Default spacing between consecutive photo sends.
pub const PHOTO_INTERVAL: Duration = Duration::from_millis(500);

/// Why a handler could not complete.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Fetch(#[from] RemoteFetchError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Routes commands and button presses to their handlers.
pub struct CommandHandler {
    messenger: Arc<dyn Messenger>,
    feeds: Arc<dyn SpaceFeeds>,
    subscribers: Arc<SubscriberRegistry>,
    translator: Option<Arc<dyn Translator>>,

    /// Own username, for `/cmd@username` matching. `None` if unknown.
    bot_username: Option<String>,

    photo_pacer: RateLimiter,
    display_offset: FixedOffset,
    broadcast_time: DailyTime,
}

impl CommandHandler {
    /// Creates a new handler with default pacing, UTC+8 display offset and a
    /// 12:00 UTC broadcast.
    #[must_use]
    pub fn new(
        messenger: Arc<dyn Messenger>,
        feeds: Arc<dyn SpaceFeeds>,
        subscribers: Arc<SubscriberRegistry>,
    ) -> Self {
        Self {
            messenger,
            feeds,
            subscribers,
            translator: None,
            bot_username: None,
            photo_pacer: RateLimiter::new(PHOTO_INTERVAL),
            display_offset: FixedOffset::east_opt(8 * 3600).unwrap_or(Utc.fix()),
            broadcast_time: DailyTime::default(),
        }
    }

    #[must_use]
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    #[must_use]
    pub fn with_bot_username(mut self, username: Option<String>) -> Self {
        self.bot_username = username;
        self
    }

    #[must_use]
    pub fn with_photo_interval(mut self, interval: Duration) -> Self {
        self.photo_pacer = RateLimiter::new(interval);
        self
    }

    #[must_use]
    pub const fn with_display_offset(mut self, offset: FixedOffset) -> Self {
        self.display_offset = offset;
        self
    }

    #[must_use]
    pub const fn with_broadcast_time(mut self, time: DailyTime) -> Self {
        self.broadcast_time = time;
        self
    }

    #[must_use]
    pub fn subscribers(&self) -> &Arc<SubscriberRegistry> {
        &self.subscribers
    }

    /// Processes one incoming update to completion.
    pub async fn handle_update(&self, update: Update) {
        debug!("Processing update {}", update.update_id);

        if let Some(query) = update.callback_query {
            self.handle_callback(query).await;
        } else if let Some(message) = update.message
            && let Some(text) = message.text.as_deref()
        {
            self.try_handle(message.chat.id, text).await;
        }
    }

    /// Tries to parse and execute a command from a message.
    ///
    /// Returns `false` if the message is not a command for this bot.
    pub async fn try_handle(&self, chat_id: ChatId, message_text: &str) -> bool {
        let Some(command) = BotCommand::parse(message_text, self.bot_username.as_deref()) else {
            return false;
        };

        debug!("Handling command {} from chat {}", command, chat_id);
        let label = command.to_string();
        let result = self.execute(chat_id, command).await;
        self.settle(chat_id, &label, MenuAction::ApodDaily.apology(), result)
            .await;
        self.send_menu(chat_id).await;
        true
    }

    /// Executes a parsed command.
    async fn execute(&self, chat_id: ChatId, command: BotCommand) -> Result<(), ActionError> {
        match command {
            BotCommand::Start => self.send(chat_id, format::welcome()).await,
            BotCommand::Subscribe => {
                let outcome = self.subscribers.subscribe(chat_id).await;
                let reply = format::subscribe_reply(outcome, &self.broadcast_time.to_string());
                self.send(chat_id, reply).await
            }
            BotCommand::Unsubscribe => {
                let outcome = self.subscribers.unsubscribe(chat_id).await;
                self.send(chat_id, format::unsubscribe_reply(outcome)).await
            }
            BotCommand::Apod(request) => self.handle_apod(chat_id, request).await,
            BotCommand::Help => self.send(chat_id, format::help_message()).await,
        }
    }

    async fn handle_apod(&self, chat_id: ChatId, request: ApodRequest) -> Result<(), ActionError> {
        let today = Utc::now().date_naive();
        match request {
            ApodRequest::Today => self.send_apod(chat_id, None).await,
            ApodRequest::On(date) if is_valid_apod_date(date, today) => {
                self.send_apod(chat_id, Some(date)).await
            }
            ApodRequest::On(_) | ApodRequest::Invalid(_) => {
                self.send(chat_id, format::apod_usage(today)).await
            }
        }
    }

    /// Handles an inline button press. Unknown callback data is ignored; the
    /// menu is shown either way.
    pub async fn handle_callback(&self, query: CallbackQuery) {
        if let Err(e) = self.messenger.acknowledge(&query.id).await {
            warn!("Failed to answer callback query {}: {}", query.id, e);
        }

        let Some(chat_id) = query.message.as_ref().map(|m| m.chat.id) else {
            debug!("Callback query {} carries no message, ignoring", query.id);
            return;
        };

        match query.data.as_deref().and_then(MenuAction::from_callback_data) {
            Some(action) => self.run_action(chat_id, action).await,
            None => debug!(
                "Ignoring unknown callback data {:?} from chat {}",
                query.data, chat_id
            ),
        }

        self.send_menu(chat_id).await;
    }

    /// Runs one menu action, converting failures into an apology.
    pub async fn run_action(&self, chat_id: ChatId, action: MenuAction) {
        debug!("Running {} for chat {}", action, chat_id);
        let today = Utc::now().date_naive();

        let result = match action {
            MenuAction::ApodDaily => self.send_apod(chat_id, None).await,
            MenuAction::ApodRandom => {
                let date = random_apod_date(today, &mut rand::thread_rng());
                self.send_apod(chat_id, Some(date)).await
            }
            MenuAction::NeoInfo => self.send_neo(chat_id, today).await,
            MenuAction::MarsRoverPhotos => self.send_rover_photos(chat_id).await,
            MenuAction::EpicEarthImage => self.send_epic(chat_id).await,
            MenuAction::IssLocation => self.send_iss(chat_id).await,
            MenuAction::AstronomyFact => {
                let fact = random_fact(&mut rand::thread_rng());
                self.send(chat_id, format::fact_message(fact)).await
            }
            MenuAction::MoonPhaseInfo => {
                self.send(chat_id, format::moon_message(moon_phase(today), today))
                    .await
            }
            MenuAction::SolarFlareReport => self.send_flares(chat_id, today).await,
            MenuAction::GeomagneticStormReport => self.send_storms(chat_id, today).await,
        };

        self.settle(chat_id, action.callback_data(), action.apology(), result)
            .await;
    }

    /// Sends today's APOD to one subscriber. Used by the daily broadcast.
    ///
    /// A fetch failure still sends the recipient the apology.
    ///
    /// # Errors
    ///
    /// Returns the fetch or transport failure so the caller can count it.
    pub async fn deliver_daily_apod(&self, chat_id: ChatId) -> Result<(), ActionError> {
        let result = self.send_apod(chat_id, None).await;
        if let Err(ActionError::Fetch(_)) = &result {
            let apology = Outgoing::text(MenuAction::ApodDaily.apology());
            self.messenger.deliver(chat_id, &apology).await?;
        }
        result
    }

    async fn send_apod(&self, chat_id: ChatId, date: Option<NaiveDate>) -> Result<(), ActionError> {
        let apod = self.feeds.apod(date).await?;
        let explanation =
            translate_or_original(self.translator.as_deref(), &apod.explanation).await;
        self.send(chat_id, format::apod_message(&apod, &explanation, date))
            .await
    }

    async fn send_neo(&self, chat_id: ChatId, today: NaiveDate) -> Result<(), ActionError> {
        let objects = self.feeds.near_earth_objects(today).await?;
        self.send(chat_id, format::neo_message(&objects)).await
    }

    async fn send_rover_photos(&self, chat_id: ChatId) -> Result<(), ActionError> {
        let photos = newest_photos(self.feeds.mars_photos().await?, ROVER_PHOTO_LIMIT);
        if photos.is_empty() {
            return self.send(chat_id, format::no_rover_photos()).await;
        }

        for photo in &photos {
            self.photo_pacer.wait_and_acquire().await;
            self.send(chat_id, format::rover_photo_message(photo)).await?;
        }
        Ok(())
    }

    async fn send_epic(&self, chat_id: ChatId) -> Result<(), ActionError> {
        let message = match self.feeds.epic_latest().await? {
            Some(image) => format::epic_message(&image),
            None => format::no_epic_image(),
        };
        self.send(chat_id, message).await
    }

    async fn send_iss(&self, chat_id: ChatId) -> Result<(), ActionError> {
        let position = self.feeds.iss_position().await?;
        self.send(chat_id, format::iss_message(&position)).await
    }

    async fn send_flares(&self, chat_id: ChatId, today: NaiveDate) -> Result<(), ActionError> {
        self.send(chat_id, format::fetching_notice("solar flare"))
            .await?;
        let flares = self.feeds.solar_flares(today).await?;
        self.send(chat_id, format::flare_report(&flares)).await?;
        info!("Sent solar flare report ({} events) to chat {}", flares.len(), chat_id);
        Ok(())
    }

    async fn send_storms(&self, chat_id: ChatId, today: NaiveDate) -> Result<(), ActionError> {
        self.send(chat_id, format::fetching_notice("geomagnetic storm"))
            .await?;
        let summary = self.feeds.storm_summary(today).await?;
        self.send(
            chat_id,
            format::storm_report(summary.as_ref(), self.display_offset),
        )
        .await
    }

    async fn send(&self, chat_id: ChatId, message: Outgoing) -> Result<(), ActionError> {
        self.messenger.deliver(chat_id, &message).await?;
        Ok(())
    }

    async fn send_menu(&self, chat_id: ChatId) {
        if let Err(e) = self.messenger.deliver(chat_id, &format::main_menu()).await {
            error!("Failed to send main menu to chat {}: {}", chat_id, e);
        }
    }

    /// Logs a failed handler and, for fetch failures, sends one apology.
    async fn settle(
        &self,
        chat_id: ChatId,
        label: &str,
        apology: &str,
        result: Result<(), ActionError>,
    ) {
        match result {
            Ok(()) => {}
            Err(ActionError::Fetch(e)) => {
                error!("{} for chat {} failed: {}", label, chat_id, e);
                if let Err(e) = self.messenger.deliver(chat_id, &Outgoing::text(apology)).await {
                    error!("Failed to send apology to chat {}: {}", chat_id, e);
                }
            }
            Err(ActionError::Transport(e)) => {
                error!("Sending {} to chat {} failed: {}", label, chat_id, e);
            }
        }
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("bot_username", &self.bot_username)
            .field("translation", &self.translator.is_some())
            .field("display_offset", &self.display_offset)
            .field("broadcast_time", &self.broadcast_time)
            .finish_non_exhaustive()
    }
}
