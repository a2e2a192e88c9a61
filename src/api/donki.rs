//! DONKI space-weather notifications: solar flares (FLR) and geomagnetic
//! storms (GST).
//!
//! DONKI needs no API key. Quiet days come back as `[]` or, occasionally, as
//! an empty body; both mean "no events".

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::client::{ApiClient, decode};
use super::error::{Endpoint, FetchResult, RemoteFetchError};

/// One solar flare event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolarFlare {
    /// GOES class, e.g. `M1.2`.
    pub class_type: String,
    pub peak_time: Option<DateTime<Utc>>,
    /// Heliographic location, e.g. `N15W30`.
    pub source_location: Option<String>,
}

/// One Kp observation attached to a storm.
#[derive(Debug, Clone, PartialEq)]
pub struct KpReading {
    pub observed_at: DateTime<Utc>,
    /// Reported in thirds (e.g. 5.67).
    pub kp_index: f64,
    pub source: Option<String>,
}

/// The latest Kp reading across the day's storms.
#[derive(Debug, Clone, PartialEq)]
pub struct StormSummary {
    pub storm_count: usize,
    pub latest: KpReading,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFlare {
    #[serde(default)]
    class_type: Option<String>,
    #[serde(default)]
    peak_time: Option<String>,
    #[serde(default)]
    source_location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStorm {
    #[serde(default)]
    all_kp_index: Option<Vec<RawKp>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawKp {
    observed_time: String,
    kp_index: f64,
    #[serde(default)]
    source: Option<String>,
}

/// Parses DONKI timestamps such as `2024-05-10T06:54Z`.
#[must_use]
pub fn parse_donki_time(raw: &str) -> Option<DateTime<Utc>> {
    ["%Y-%m-%dT%H:%MZ", "%Y-%m-%dT%H:%M:%SZ"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

fn decode_events<T: DeserializeOwned>(endpoint: Endpoint, body: &str) -> FetchResult<Vec<T>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    decode(endpoint, body)
}

impl From<RawFlare> for SolarFlare {
    fn from(raw: RawFlare) -> Self {
        Self {
            class_type: raw
                .class_type
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "N/A".to_owned()),
            peak_time: raw.peak_time.as_deref().and_then(parse_donki_time),
            source_location: raw.source_location.filter(|s| !s.is_empty()),
        }
    }
}

fn summarize_storms(storms: Vec<RawStorm>) -> FetchResult<Option<StormSummary>> {
    let storm_count = storms.len();
    let Some(last) = storms.into_iter().last() else {
        return Ok(None);
    };

    let raw = last
        .all_kp_index
        .and_then(|readings| readings.into_iter().last())
        .ok_or_else(|| RemoteFetchError::missing(Endpoint::GeomagneticStorms, "allKpIndex"))?;

    let observed_at = parse_donki_time(&raw.observed_time).ok_or_else(|| {
        RemoteFetchError::invalid(Endpoint::GeomagneticStorms, "observedTime", &raw.observed_time)
    })?;

    Ok(Some(StormSummary {
        storm_count,
        latest: KpReading {
            observed_at,
            kp_index: raw.kp_index,
            source: raw.source,
        },
    }))
}

fn date_range(date: NaiveDate) -> [(&'static str, String); 2] {
    let day = date.format("%Y-%m-%d").to_string();
    [("startDate", day.clone()), ("endDate", day)]
}

impl ApiClient {
    /// Fetches the solar flares recorded on `date`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, timeout, non-2xx or bad JSON.
    pub async fn fetch_solar_flares(&self, date: NaiveDate) -> FetchResult<Vec<SolarFlare>> {
        let url = format!("{}/FLR", self.bases.donki);
        let body = self
            .get_body(Endpoint::SolarFlares, &url, &date_range(date), self.timeouts.slow)
            .await?;
        let flares: Vec<RawFlare> = decode_events(Endpoint::SolarFlares, &body)?;
        Ok(flares.into_iter().map(SolarFlare::from).collect())
    }

    /// Fetches the latest Kp reading of the storms recorded on `date`.
    ///
    /// Returns `Ok(None)` when no storm was recorded.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, timeout, non-2xx, bad JSON, or
    /// when the latest storm carries no Kp readings.
    pub async fn fetch_storm_summary(&self, date: NaiveDate) -> FetchResult<Option<StormSummary>> {
        let url = format!("{}/GST", self.bases.donki);
        let body = self
            .get_body(Endpoint::GeomagneticStorms, &url, &date_range(date), self.timeouts.slow)
            .await?;
        let storms: Vec<RawStorm> = decode_events(Endpoint::GeomagneticStorms, &body)?;
        summarize_storms(storms)
    }
}
