//! Renders fetched records into Telegram messages.
//!
//! Everything here is pure: no I/O, no clock. Callers pass in the date and
//! the (possibly translated) text.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::api::{
    Apod, EpicImage, IssPosition, MediaKind, NearEarthObject, RoverPhoto, SolarFlare, StormSummary,
};
use crate::astro::{MoonPhase, classify_kp, round_kp};
use crate::commands::{BotCommand, MenuAction};
use crate::subscribers::{SubscribeOutcome, UnsubscribeOutcome};
use crate::telegram::{CAPTION_LIMIT, InlineKeyboardButton, InlineKeyboardMarkup, Outgoing};

/// Maximum number of asteroids listed in the NEO report.
pub const NEO_LIST_LIMIT: usize = 5;

/// Maximum number of flares listed in the flare report.
pub const FLARE_LIST_LIMIT: usize = 5;

const MENU_PROMPT: &str = "Choose an astronomy feature:";

/// Escapes the characters legacy `Markdown` treats as entity markers.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

/// Cuts `text` to at most `max_chars` characters, ending with an ellipsis
/// when shortened. Never leaves a dangling escape backslash.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    if max_chars == 0 {
        return String::new();
    }

    let mut cut: String = text.chars().take(max_chars - 1).collect();
    let trailing = cut.chars().rev().take_while(|&c| c == '\\').count();
    if trailing % 2 == 1 {
        cut.pop();
    }
    cut.push('…');
    cut
}

/// Formats `value` rounded to an integer with `,` thousands separators.
#[must_use]
pub fn group_thousands(value: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// The main menu: five rows of two buttons.
#[must_use]
pub fn menu_keyboard() -> InlineKeyboardMarkup {
    let inline_keyboard = MenuAction::ALL
        .chunks(2)
        .map(|row| {
            row.iter()
                .map(|action| InlineKeyboardButton {
                    text: action.label().to_owned(),
                    callback_data: action.callback_data().to_owned(),
                })
                .collect()
        })
        .collect();
    InlineKeyboardMarkup { inline_keyboard }
}

#[must_use]
pub fn main_menu() -> Outgoing {
    Outgoing::text(MENU_PROMPT).with_keyboard(menu_keyboard())
}

#[must_use]
pub fn welcome() -> Outgoing {
    Outgoing::text("✨ Welcome to the NASA Astronomy Bot! ✨")
}

#[must_use]
pub fn help_message() -> Outgoing {
    let mut lines = vec!["*Commands*".to_owned(), String::new()];
    for (usage, description) in BotCommand::all_commands() {
        lines.push(format!("/{} - {}", escape_markdown(usage), description));
    }
    lines.push(String::new());
    lines.push("Or pick a feature from the menu below.".to_owned());
    Outgoing::text(lines.join("\n")).markdown()
}

#[must_use]
pub fn subscribe_reply(outcome: SubscribeOutcome, broadcast_at: &str) -> Outgoing {
    match outcome {
        SubscribeOutcome::Subscribed => Outgoing::text(format!(
            "✅ Subscribed to the daily NASA APOD (sent every day at {broadcast_at})."
        )),
        SubscribeOutcome::AlreadySubscribed => Outgoing::text("You are already subscribed!"),
    }
}

#[must_use]
pub fn unsubscribe_reply(outcome: UnsubscribeOutcome) -> Outgoing {
    match outcome {
        UnsubscribeOutcome::Unsubscribed => Outgoing::text("❌ Unsubscribed."),
        UnsubscribeOutcome::NotSubscribed => Outgoing::text("You are not subscribed."),
    }
}

/// Reply to an `/apod` argument that is not a usable date.
#[must_use]
pub fn apod_usage(today: NaiveDate) -> Outgoing {
    Outgoing::text(format!(
        "Usage: /apod [YYYY-MM-DD]\nDates run from 1995-06-16 to {}.",
        today.format("%Y-%m-%d")
    ))
}

/// Renders an APOD entry.
///
/// Images become a photo with a caption cut to Telegram's caption limit;
/// other media become text with a link. `dated` prefixes the caption with
/// that date.
#[must_use]
pub fn apod_message(apod: &Apod, explanation: &str, dated: Option<NaiveDate>) -> Outgoing {
    let mut header = String::new();
    if let Some(date) = dated {
        header.push_str(&format!("🗓️ *{}*\n", date.format("%Y-%m-%d")));
    }
    header.push_str(&format!("🌌 *{}*\n\n", escape_markdown(&apod.title)));
    let body = escape_markdown(explanation);

    if apod.media_type == MediaKind::Image && !apod.url.is_empty() {
        let budget = CAPTION_LIMIT.saturating_sub(header.chars().count());
        let caption = format!("{header}{}", truncate_chars(&body, budget));
        return Outgoing::photo(apod.url.clone(), caption).markdown();
    }

    let mut text = format!("{header}{body}");
    if !apod.url.is_empty() {
        text.push_str(&format!("\n\n[View content]({})", apod.url));
    }
    Outgoing::text(text).markdown()
}

#[must_use]
pub fn neo_message(objects: &[NearEarthObject]) -> Outgoing {
    if objects.is_empty() {
        return Outgoing::text("No known near-Earth asteroids pass by today.");
    }

    let mut lines = vec![format!(
        "☄️ *Near-Earth asteroids today ({})*:\n",
        objects.len()
    )];
    for object in objects.iter().take(NEO_LIST_LIMIT) {
        let hazard = if object.hazardous {
            "⚠️ Potentially hazardous"
        } else {
            "✅ Not hazardous"
        };
        let distance = object
            .miss_distance_km
            .map_or_else(|| "unknown".to_owned(), |km| format!("{} km", group_thousands(km)));
        lines.push(format!(
            "*{}* ({})\n- Closest approach: {}\n- Estimated diameter: {:.2} m\n",
            escape_markdown(&object.name),
            hazard,
            distance,
            object.diameter_max_m
        ));
    }
    Outgoing::text(lines.join("\n")).markdown()
}

#[must_use]
pub fn rover_photo_message(photo: &RoverPhoto) -> Outgoing {
    let caption = format!(
        "📸 *Mars Rover Photo*\n- Rover: {}\n- Camera: {}\n- Earth date: {}",
        escape_markdown(&photo.rover.name),
        escape_markdown(&photo.camera.full_name),
        photo.earth_date.format("%Y-%m-%d")
    );
    Outgoing::photo(photo.img_src.clone(), caption).markdown()
}

#[must_use]
pub fn no_rover_photos() -> Outgoing {
    Outgoing::text("Sorry, there are no recent photos from Perseverance right now.")
}

#[must_use]
pub fn epic_message(image: &EpicImage) -> Outgoing {
    let caption = format!(
        "🌍 *Earth Today (EPIC)*\nTaken: {} UTC",
        image.taken_at.format("%Y-%m-%d %H:%M:%S")
    );
    Outgoing::photo(image.image_url.clone(), caption).markdown()
}

#[must_use]
pub fn no_epic_image() -> Outgoing {
    Outgoing::text("Sorry, the latest Earth image is not available yet.")
}

#[must_use]
pub fn iss_message(position: &IssPosition) -> Outgoing {
    let mut lines = vec![
        "🛰️ *International Space Station: live position*".to_owned(),
        format!("- Longitude: `{:.4}`", position.longitude),
        format!("- Latitude: `{:.4}`", position.latitude),
    ];
    if let Some(altitude) = position.altitude_km {
        lines.push(format!("- Altitude: {altitude:.1} km"));
    }
    if let Some(velocity) = position.velocity_kmh {
        lines.push(format!("- Velocity: {} km/h", group_thousands(velocity)));
    }
    lines.push(format!(
        "- Updated: {}",
        position.observed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(String::new());
    lines.push(format!(
        "[View on map](https://www.google.com/maps/search/?api=1&query={},{})",
        position.latitude, position.longitude
    ));
    Outgoing::text(lines.join("\n")).markdown()
}

#[must_use]
pub fn moon_message(phase: MoonPhase, date: NaiveDate) -> Outgoing {
    Outgoing::text(format!(
        "🌙 *Today's Moon phase*: {}\nDate: {}",
        phase.label(),
        date.format("%B %-d, %Y")
    ))
    .markdown()
}

#[must_use]
pub fn fact_message(fact: &str) -> Outgoing {
    Outgoing::text(fact)
}

/// Progress notice sent before a slow DONKI query.
#[must_use]
pub fn fetching_notice(what: &str) -> Outgoing {
    Outgoing::text(format!("Fetching {what} data from NASA DONKI..."))
}

/// Renders the day's flares, newest first. DONKI lists them oldest first.
#[must_use]
pub fn flare_report(flares: &[SolarFlare]) -> Outgoing {
    if flares.is_empty() {
        return Outgoing::text(
            "☀️ *The Sun is calm today*\n\nNASA DONKI has recorded no solar flares so far today.",
        )
        .markdown();
    }

    let mut message = format!("💥 *Solar flares today ({} total)*\n", flares.len());
    for flare in flares.iter().rev().take(FLARE_LIST_LIMIT) {
        let peak = flare
            .peak_time
            .map_or_else(|| "N/A".to_owned(), |t| t.format("%H:%M").to_string());
        let region = flare
            .source_location
            .as_deref()
            .map_or_else(|| "Unknown region".to_owned(), escape_markdown);
        message.push_str(&format!(
            "\n- *Class*: `{}`\n- *Peak (UTC)*: `{}`\n- *Source*: {}\n",
            flare.class_type, peak, region
        ));
    }
    Outgoing::text(message).markdown()
}

/// Renders `UTC+8` style labels for a whole-hour offset.
fn offset_label(offset: FixedOffset) -> String {
    let hours = offset.local_minus_utc() / 3600;
    if hours >= 0 {
        format!("UTC+{hours}")
    } else {
        format!("UTC{hours}")
    }
}

/// Renders the latest Kp reading of the day's storms.
#[must_use]
pub fn storm_report(summary: Option<&StormSummary>, display_offset: FixedOffset) -> Outgoing {
    let Some(summary) = summary else {
        return Outgoing::text(
            "✅ *Geomagnetic activity is calm today*\n\nNASA DONKI has recorded no geomagnetic storms so far today.",
        )
        .markdown();
    };

    let reading = &summary.latest;
    let (condition, level) = match round_kp(reading.kp_index).and_then(classify_kp) {
        Some(class) => (class.severity.label(), class.scale.to_string()),
        None => ("❔ Unknown", "N/A".to_owned()),
    };
    let observed: DateTime<Utc> = reading.observed_at;
    let local = observed.with_timezone(&display_offset);

    let lines = [
        "🌋 *Geomagnetic storm report (DONKI)*".to_owned(),
        String::new(),
        format!("📈 *Latest observed Kp index*: `{:.2}`", reading.kp_index),
        format!("- *Current conditions*: {condition}"),
        format!("- *Storm level*: {level}"),
        format!("- *Storms recorded today*: {}", summary.storm_count),
        String::new(),
        "🕒 *Observed*".to_owned(),
        format!("- UTC: `{}`", observed.format("%Y-%m-%d %H:%M")),
        format!(
            "- {}: `{}`",
            offset_label(display_offset),
            local.format("%Y-%m-%d %H:%M")
        ),
        String::new(),
        "ℹ️ *Source*: NASA DONKI (Database Of Notifications, Knowledge, Information)".to_owned(),
    ];
    Outgoing::text(lines.join("\n")).markdown()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDateTime, TimeZone};

    use super::*;
    use crate::api::{KpReading, RoverCamera, RoverInfo};
    use crate::telegram::Content;

    fn apod(media_type: MediaKind, explanation_len: usize) -> Apod {
        Apod {
            title: "Pillars_of*Creation".to_owned(),
            explanation: "x".repeat(explanation_len),
            url: "https://apod.nasa.gov/a.jpg".to_owned(),
            media_type,
            date: None,
            copyright: None,
        }
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a_b*c`d[e]"), "a\\_b\\*c\\`d\\[e]");
        assert_eq!(escape_markdown("plain"), "plain");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.4), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(7_480_123.6), "7,480,124");
        assert_eq!(group_thousands(-12_345.0), "-12,345");
    }

    #[test]
    fn test_truncate_chars_drops_dangling_escape() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 4), "abc…");
        assert_eq!(truncate_chars("ab\\_cd", 4), "ab…");
    }

    #[test]
    fn test_menu_layout() {
        let keyboard = menu_keyboard();
        assert_eq!(keyboard.inline_keyboard.len(), 5);
        assert!(keyboard.inline_keyboard.iter().all(|row| row.len() == 2));
        assert_eq!(keyboard.inline_keyboard[0][0].callback_data, "apod_daily");
        assert_eq!(
            keyboard.inline_keyboard[4][1].callback_data,
            "geomagnetic_storm_report"
        );
        assert!(main_menu().keyboard.is_some());
    }

    #[test]
    fn test_apod_caption_truncated() {
        let entry = apod(MediaKind::Image, 5000);
        let message = apod_message(&entry, &entry.explanation, None);
        assert!(message.is_photo());
        assert!(message.body().chars().count() <= CAPTION_LIMIT);
        assert!(message.body().ends_with('…'));
        assert!(message.body().contains("Pillars\\_of\\*Creation"));
    }

    #[test]
    fn test_apod_random_has_date_prefix() {
        let entry = apod(MediaKind::Image, 10);
        let date = NaiveDate::from_ymd_opt(2003, 4, 5).unwrap();
        let message = apod_message(&entry, "Translated", Some(date));
        assert!(message.body().starts_with("🗓️ *2003-04-05*\n🌌"));
        assert!(message.body().ends_with("Translated"));
    }

    #[test]
    fn test_apod_video_links_content() {
        let entry = apod(MediaKind::Video, 10);
        let message = apod_message(&entry, "Watch", None);
        assert!(!message.is_photo());
        assert!(message.body().ends_with("[View content](https://apod.nasa.gov/a.jpg)"));
    }

    #[test]
    fn test_neo_message() {
        assert!(neo_message(&[]).body().starts_with("No known"));

        let objects: Vec<NearEarthObject> = (0..7)
            .map(|i| NearEarthObject {
                name: format!("(2024 AB{i})"),
                hazardous: i == 0,
                miss_distance_km: Some(1_234_567.8),
                diameter_max_m: 12.346,
            })
            .collect();
        let message = neo_message(&objects);
        let body = message.body();
        assert!(body.contains("(7)"));
        assert!(body.contains("1,234,568 km"));
        assert!(body.contains("12.35 m"));
        assert!(body.contains("⚠️ Potentially hazardous"));
        assert_eq!(body.matches("Closest approach").count(), NEO_LIST_LIMIT);
    }

    #[test]
    fn test_rover_photo_message() {
        let photo = RoverPhoto {
            id: 1,
            img_src: "https://mars/1.jpg".to_owned(),
            earth_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            camera: RoverCamera {
                name: "NAVCAM_LEFT".to_owned(),
                full_name: "Navigation Camera - Left".to_owned(),
            },
            rover: RoverInfo {
                name: "Perseverance".to_owned(),
            },
        };
        let message = rover_photo_message(&photo);
        assert!(matches!(&message.content, Content::Photo { url, .. } if url == "https://mars/1.jpg"));
        assert!(message.body().contains("Earth date: 2024-06-01"));
    }

    #[test]
    fn test_epic_message() {
        let image = EpicImage {
            image_url: "https://epic/1.png".to_owned(),
            taken_at: NaiveDateTime::parse_from_str("2024-06-10 00:13:03", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            caption: "Earth".to_owned(),
        };
        assert!(epic_message(&image).body().contains("2024-06-10 00:13:03 UTC"));
    }

    #[test]
    fn test_iss_message() {
        let position = IssPosition {
            latitude: 12.345_678,
            longitude: -98.765_432,
            observed_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            altitude_km: None,
            velocity_kmh: Some(27_580.4),
        };
        let body = iss_message(&position).body().to_owned();
        assert!(body.contains("`-98.7654`"));
        assert!(body.contains("`12.3457`"));
        assert!(body.contains("2024-01-02 03:04:05 UTC"));
        assert!(body.contains("27,580 km/h"));
        assert!(!body.contains("Altitude"));
        assert!(body.contains("query=12.345678,-98.765432"));
    }

    #[test]
    fn test_moon_message() {
        let date = NaiveDate::from_ymd_opt(2000, 1, 21).unwrap();
        let body = moon_message(MoonPhase::FullMoon, date).body().to_owned();
        assert!(body.contains("Full Moon"));
        assert!(body.contains("January 21, 2000"));
    }

    #[test]
    fn test_flare_report_newest_first_and_capped() {
        assert!(flare_report(&[]).body().contains("calm"));

        let flares: Vec<SolarFlare> = (0..7)
            .map(|i| SolarFlare {
                class_type: format!("C{i}.0"),
                peak_time: Some(Utc.with_ymd_and_hms(2024, 5, 10, i, 30, 0).unwrap()),
                source_location: None,
            })
            .collect();
        let body = flare_report(&flares).body().to_owned();
        assert!(body.contains("(7 total)"));
        assert_eq!(body.matches("*Class*").count(), FLARE_LIST_LIMIT);
        let newest = body.find("C6.0").unwrap();
        let older = body.find("C2.0").unwrap();
        assert!(newest < older);
        assert!(!body.contains("C1.0"));
        assert!(body.contains("Unknown region"));
    }

    #[test]
    fn test_storm_report() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        assert!(storm_report(None, offset).body().contains("calm"));

        let summary = StormSummary {
            storm_count: 2,
            latest: KpReading {
                observed_at: Utc.with_ymd_and_hms(2024, 5, 10, 21, 0, 0).unwrap(),
                kp_index: 8.33,
                source: Some("NOAA".to_owned()),
            },
        };
        let body = storm_report(Some(&summary), offset).body().to_owned();
        assert!(body.contains("`8.33`"));
        assert!(body.contains("Severe Storm"));
        assert!(body.contains("G4"));
        assert!(body.contains("UTC: `2024-05-10 21:00`"));
        assert!(body.contains("UTC+8: `2024-05-11 05:00`"));
    }

    #[test]
    fn test_storm_report_out_of_scale() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let summary = StormSummary {
            storm_count: 1,
            latest: KpReading {
                observed_at: Utc.with_ymd_and_hms(2024, 5, 10, 2, 0, 0).unwrap(),
                kp_index: 12.0,
                source: None,
            },
        };
        let body = storm_report(Some(&summary), offset).body().to_owned();
        assert!(body.contains("Unknown"));
        assert!(body.contains("UTC-5: `2024-05-09 21:00`"));
    }

    #[test]
    fn test_subscription_replies() {
        assert!(
            subscribe_reply(SubscribeOutcome::Subscribed, "12:00 UTC")
                .body()
                .contains("12:00 UTC")
        );
        assert!(
            subscribe_reply(SubscribeOutcome::AlreadySubscribed, "12:00 UTC")
                .body()
                .contains("already")
        );
        assert!(
            unsubscribe_reply(UnsubscribeOutcome::NotSubscribed)
                .body()
                .contains("not subscribed")
        );
    }
}
