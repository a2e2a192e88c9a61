//! International Space Station position (wheretheiss.at).

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::client::ApiClient;
use super::error::{Endpoint, FetchResult, RemoteFetchError};

/// NORAD catalogue number of the ISS.
const ISS_NORAD_ID: u32 = 25544;

/// Current sub-satellite point of the ISS.
#[derive(Debug, Clone, PartialEq)]
pub struct IssPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub observed_at: DateTime<Utc>,
    pub altitude_km: Option<f64>,
    pub velocity_kmh: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPosition {
    latitude: Option<f64>,
    longitude: Option<f64>,
    timestamp: Option<i64>,
    altitude: Option<f64>,
    velocity: Option<f64>,
}

impl TryFrom<RawPosition> for IssPosition {
    type Error = RemoteFetchError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        let missing = |what| RemoteFetchError::missing(Endpoint::IssPosition, what);

        let latitude = raw.latitude.ok_or_else(|| missing("latitude"))?;
        let longitude = raw.longitude.ok_or_else(|| missing("longitude"))?;
        let timestamp = raw.timestamp.ok_or_else(|| missing("timestamp"))?;
        let observed_at = DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
            RemoteFetchError::invalid(Endpoint::IssPosition, "timestamp", timestamp.to_string())
        })?;

        Ok(Self {
            latitude,
            longitude,
            observed_at,
            altitude_km: raw.altitude,
            velocity_kmh: raw.velocity,
        })
    }
}

impl ApiClient {
    /// Fetches the current ISS position.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, timeout, non-2xx, bad JSON or a
    /// response without latitude, longitude and timestamp.
    pub async fn fetch_iss_position(&self) -> FetchResult<IssPosition> {
        let url = format!("{}/satellites/{}", self.bases.iss, ISS_NORAD_ID);
        let raw: RawPosition = self
            .get_json(Endpoint::IssPosition, &url, &[], self.timeouts.quick)
            .await?;
        IssPosition::try_from(raw)
    }
}
