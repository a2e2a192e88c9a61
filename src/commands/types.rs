//! Command and menu action definitions.

use std::fmt;

use chrono::NaiveDate;

/// What `/apod` was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApodRequest {
    /// No argument: today's picture.
    Today,
    /// A well-formed `YYYY-MM-DD` argument (range not yet checked).
    On(NaiveDate),
    /// An argument that is not a date.
    Invalid(String),
}

/// Available bot commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Greet the user and show the menu.
    Start,

    /// Join the daily APOD broadcast.
    Subscribe,

    /// Leave the daily APOD broadcast.
    Unsubscribe,

    /// Send the APOD for today or a given date.
    Apod(ApodRequest),

    /// Show help information.
    Help,
}

impl BotCommand {
    /// Parses a command from a message text.
    ///
    /// Accepts `/cmd` and `/cmd@username`. A command addressed to a
    /// different bot than `bot_username` is rejected; when the bot's own
    /// username is unknown any addressee is accepted.
    ///
    /// Returns `None` if the message is not a command for this bot.
    #[must_use]
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let text = text.trim();
        let after_slash = text.strip_prefix('/')?;

        let (head, args) = match after_slash.split_once(char::is_whitespace) {
            Some((head, args)) => (head, Some(args.trim())),
            None => (after_slash, None),
        };

        let cmd = match head.split_once('@') {
            Some((cmd, addressee)) => {
                if let Some(own) = bot_username
                    && !addressee.eq_ignore_ascii_case(own)
                {
                    return None;
                }
                cmd
            }
            None => head,
        };

        match cmd.to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "subscribe" => Some(Self::Subscribe),
            "unsubscribe" => Some(Self::Unsubscribe),
            "apod" => Some(Self::Apod(Self::parse_apod(args))),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    /// Parses apod arguments: `[YYYY-MM-DD]`
    fn parse_apod(args: Option<&str>) -> ApodRequest {
        match args.and_then(|a| a.split_whitespace().next()) {
            None => ApodRequest::Today,
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_or_else(|_| ApodRequest::Invalid(raw.to_owned()), ApodRequest::On),
        }
    }

    /// Returns the command name as it appears in help.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::Apod(_) => "apod",
            Self::Help => "help",
        }
    }

    /// Returns all available commands with their descriptions.
    #[must_use]
    pub fn all_commands() -> Vec<(&'static str, &'static str)> {
        vec![
            ("start", "Show the welcome message and menu"),
            ("subscribe", "Receive the APOD every day"),
            ("unsubscribe", "Stop the daily APOD"),
            ("apod [YYYY-MM-DD]", "Astronomy Picture of the Day, optionally for a date"),
            ("help", "Show this help message"),
        ]
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apod(ApodRequest::On(date)) => write!(f, "/apod {date}"),
            Self::Apod(ApodRequest::Invalid(raw)) => write!(f, "/apod {raw}"),
            _ => write!(f, "/{}", self.name()),
        }
    }
}

/// One button of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    ApodDaily,
    ApodRandom,
    NeoInfo,
    MarsRoverPhotos,
    EpicEarthImage,
    IssLocation,
    AstronomyFact,
    MoonPhaseInfo,
    SolarFlareReport,
    GeomagneticStormReport,
}

impl MenuAction {
    /// Menu order: five rows of two.
    pub const ALL: [Self; 10] = [
        Self::ApodDaily,
        Self::ApodRandom,
        Self::NeoInfo,
        Self::MarsRoverPhotos,
        Self::EpicEarthImage,
        Self::IssLocation,
        Self::AstronomyFact,
        Self::MoonPhaseInfo,
        Self::SolarFlareReport,
        Self::GeomagneticStormReport,
    ];

    #[must_use]
    pub const fn callback_data(self) -> &'static str {
        match self {
            Self::ApodDaily => "apod_daily",
            Self::ApodRandom => "apod_random",
            Self::NeoInfo => "neo_info",
            Self::MarsRoverPhotos => "mars_rover_photos",
            Self::EpicEarthImage => "epic_earth_image",
            Self::IssLocation => "iss_location",
            Self::AstronomyFact => "astronomy_fact",
            Self::MoonPhaseInfo => "moon_phase_info",
            Self::SolarFlareReport => "solar_flare_report",
            Self::GeomagneticStormReport => "geomagnetic_storm_report",
        }
    }

    #[must_use]
    pub fn from_callback_data(data: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.callback_data() == data)
    }

    /// Button label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ApodDaily => "🌌 Picture of the Day",
            Self::ApodRandom => "🎲 Random APOD",
            Self::NeoInfo => "☄️ Near-Earth Asteroids",
            Self::MarsRoverPhotos => "📸 Mars Rover Photos",
            Self::EpicEarthImage => "🌍 Earth Today (EPIC)",
            Self::IssLocation => "🛰️ ISS Location",
            Self::AstronomyFact => "💡 Astronomy Fact",
            Self::MoonPhaseInfo => "🌙 Moon Phase",
            Self::SolarFlareReport => "💥 Solar Flares",
            Self::GeomagneticStormReport => "🌋 Geomagnetic Storms",
        }
    }

    /// Message sent when the action's data source fails.
    #[must_use]
    pub const fn apology(self) -> &'static str {
        match self {
            Self::ApodDaily | Self::ApodRandom => {
                "Sorry, the Astronomy Picture of the Day could not be fetched."
            }
            Self::NeoInfo => "Sorry, near-Earth asteroid data is unavailable right now.",
            Self::MarsRoverPhotos => "Sorry, Mars rover photos are unavailable right now.",
            Self::EpicEarthImage => "Sorry, the latest Earth image could not be fetched.",
            Self::IssLocation => "Sorry, the ISS position is unavailable right now.",
            Self::AstronomyFact | Self::MoonPhaseInfo => "Sorry, something went wrong.",
            Self::SolarFlareReport => {
                "Sorry, NASA DONKI solar flare data is unavailable right now."
            }
            Self::GeomagneticStormReport => {
                "Sorry, NASA DONKI geomagnetic storm data is unavailable right now."
            }
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.callback_data())
    }
}
