//! Astronomy Picture of the Day.

use chrono::NaiveDate;
use serde::Deserialize;

use super::client::ApiClient;
use super::error::{Endpoint, FetchResult};

/// Kind of media an APOD entry links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
    #[serde(other)]
    Other,
}

/// One APOD entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Apod {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_explanation")]
    pub explanation: String,

    /// Image or video URL (may be empty for `other` media).
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub media_type: MediaKind,

    #[serde(default)]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub copyright: Option<String>,
}

fn default_title() -> String {
    "Untitled".to_owned()
}

fn default_explanation() -> String {
    "No explanation.".to_owned()
}

impl ApiClient {
    /// Fetches today's APOD, or the one for `date`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, timeout, non-2xx or bad JSON.
    pub async fn fetch_apod(&self, date: Option<NaiveDate>) -> FetchResult<Apod> {
        let mut query = vec![("api_key", self.api_key().to_owned())];
        if let Some(date) = date {
            query.push(("date", date.format("%Y-%m-%d").to_string()));
        }

        self.get_json(
            Endpoint::Apod,
            &self.nasa_url("/planetary/apod"),
            &query,
            self.timeouts.standard,
        )
        .await
    }
}
