//! Vendor API clients: NASA open APIs, DONKI and the ISS tracker.
//!
//! Every fetch is a single GET with a fixed timeout, returning a typed record
//! or a [`RemoteFetchError`]. Callers convert failures into user messages.

mod apod;
mod client;
mod donki;
mod epic;
mod error;
mod iss;
mod mars;
mod neo;

use async_trait::async_trait;
use chrono::NaiveDate;

pub use apod::{Apod, MediaKind};
pub use client::{ApiClient, BaseUrls, RequestTimeouts};
pub use donki::{KpReading, SolarFlare, StormSummary, parse_donki_time};
pub use epic::EpicImage;
pub use error::{Endpoint, FetchErrorKind, FetchResult, RemoteFetchError};
pub use iss::IssPosition;
pub use mars::{RoverCamera, RoverInfo, RoverPhoto, newest_photos};
pub use neo::NearEarthObject;

/// The data sources behind the menu actions.
#[async_trait]
pub trait SpaceFeeds: Send + Sync {
    async fn apod(&self, date: Option<NaiveDate>) -> FetchResult<Apod>;

    async fn near_earth_objects(&self, date: NaiveDate) -> FetchResult<Vec<NearEarthObject>>;

    async fn mars_photos(&self) -> FetchResult<Vec<RoverPhoto>>;

    async fn epic_latest(&self) -> FetchResult<Option<EpicImage>>;

    async fn iss_position(&self) -> FetchResult<IssPosition>;

    async fn solar_flares(&self, date: NaiveDate) -> FetchResult<Vec<SolarFlare>>;

    async fn storm_summary(&self, date: NaiveDate) -> FetchResult<Option<StormSummary>>;
}

#[async_trait]
impl SpaceFeeds for ApiClient {
    async fn apod(&self, date: Option<NaiveDate>) -> FetchResult<Apod> {
        self.fetch_apod(date).await
    }

    async fn near_earth_objects(&self, date: NaiveDate) -> FetchResult<Vec<NearEarthObject>> {
        self.fetch_neo_feed(date).await
    }

    async fn mars_photos(&self) -> FetchResult<Vec<RoverPhoto>> {
        self.fetch_mars_photos().await
    }

    async fn epic_latest(&self) -> FetchResult<Option<EpicImage>> {
        self.fetch_epic_latest().await
    }

    async fn iss_position(&self) -> FetchResult<IssPosition> {
        self.fetch_iss_position().await
    }

    async fn solar_flares(&self, date: NaiveDate) -> FetchResult<Vec<SolarFlare>> {
        self.fetch_solar_flares(date).await
    }

    async fn storm_summary(&self, date: NaiveDate) -> FetchResult<Option<StormSummary>> {
        self.fetch_storm_summary(date).await
    }
}
