//! Mars rover photos (Perseverance).

use chrono::NaiveDate;
use serde::Deserialize;

use super::client::ApiClient;
use super::error::{Endpoint, FetchResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoverCamera {
    pub name: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoverInfo {
    pub name: String,
}

/// A single rover photo.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoverPhoto {
    pub id: u64,
    pub img_src: String,
    pub earth_date: NaiveDate,
    pub camera: RoverCamera,
    pub rover: RoverInfo,
}

#[derive(Debug, Deserialize)]
struct LatestPhotos {
    #[serde(default)]
    latest_photos: Vec<RoverPhoto>,
}

/// Keeps the `limit` photos with the highest id, newest first.
#[must_use]
pub fn newest_photos(mut photos: Vec<RoverPhoto>, limit: usize) -> Vec<RoverPhoto> {
    photos.sort_by(|a, b| b.id.cmp(&a.id));
    photos.truncate(limit);
    photos
}

impl ApiClient {
    /// Fetches Perseverance's latest photo set.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, timeout, non-2xx or bad JSON.
    pub async fn fetch_mars_photos(&self) -> FetchResult<Vec<RoverPhoto>> {
        let query = [("api_key", self.api_key().to_owned())];
        let body: LatestPhotos = self
            .get_json(
                Endpoint::MarsPhotos,
                &self.nasa_url("/mars-photos/api/v1/rovers/perseverance/latest_photos"),
                &query,
                self.timeouts.slow,
            )
            .await?;
        Ok(body.latest_photos)
    }
}
