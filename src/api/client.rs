//! Shared HTTP plumbing for the vendor API clients.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::{Endpoint, FetchErrorKind, FetchResult, RemoteFetchError};

/// Upstream base URLs, overridable for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrls {
    /// api.nasa.gov (APOD, NEO, Mars photos, EPIC).
    pub nasa: String,
    /// CCMC DONKI web service.
    pub donki: String,
    /// wheretheiss.at satellite API.
    pub iss: String,
}

impl Default for BaseUrls {
    fn default() -> Self {
        Self {
            nasa: "https://api.nasa.gov".to_owned(),
            donki: "https://kauai.ccmc.gsfc.nasa.gov/DONKI/WS/get".to_owned(),
            iss: "https://api.wheretheiss.at/v1".to_owned(),
        }
    }
}

impl BaseUrls {
    /// Points every upstream at the same base (a local stub server).
    #[must_use]
    pub fn all(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_owned();
        Self {
            nasa: base.clone(),
            donki: base.clone(),
            iss: base,
        }
    }
}

/// Per-call timeouts. A timeout is an ordinary fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeouts {
    /// ISS position.
    pub quick: Duration,
    /// APOD, NEO, EPIC.
    pub standard: Duration,
    /// Mars photos and DONKI.
    pub slow: Duration,
}

impl Default for RequestTimeouts {
    fn default() -> Self {
        Self {
            quick: Duration::from_secs(10),
            standard: Duration::from_secs(15),
            slow: Duration::from_secs(20),
        }
    }
}

impl RequestTimeouts {
    /// Uses one timeout for every call.
    #[must_use]
    pub const fn uniform(timeout: Duration) -> Self {
        Self {
            quick: timeout,
            standard: timeout,
            slow: timeout,
        }
    }
}

/// Client for NASA open APIs, DONKI and the ISS tracker.
///
/// Each fetch issues exactly one GET; nothing is retried or cached.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_key: String,
    pub(super) bases: BaseUrls,
    pub(super) timeouts: RequestTimeouts,
}

impl ApiClient {
    /// Creates a client against the production endpoints.
    #[must_use]
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            bases: BaseUrls::default(),
            timeouts: RequestTimeouts::default(),
        }
    }

    #[must_use]
    pub fn with_base_urls(mut self, bases: BaseUrls) -> Self {
        self.bases = bases;
        self
    }

    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: RequestTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub(super) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(super) fn nasa_url(&self, path: &str) -> String {
        format!("{}{}", self.bases.nasa, path)
    }

    /// Performs the GET and returns the raw body of a 2xx response.
    pub(super) async fn get_body(
        &self,
        endpoint: Endpoint,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> FetchResult<String> {
        debug!("GET {} ({})", url, endpoint);

        let response = self
            .http
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| RemoteFetchError::from_reqwest(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteFetchError::new(
                endpoint,
                FetchErrorKind::Status(status.as_u16()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| RemoteFetchError::from_reqwest(endpoint, e))
    }

    /// GET + JSON decode.
    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> FetchResult<T> {
        let body = self.get_body(endpoint, url, query, timeout).await?;
        decode(endpoint, &body)
    }
}

/// Decodes a JSON body, tagging failures with the endpoint.
pub(super) fn decode<T: DeserializeOwned>(endpoint: Endpoint, body: &str) -> FetchResult<T> {
    serde_json::from_str(body).map_err(|e| RemoteFetchError::new(endpoint, FetchErrorKind::Decode(e)))
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("bases", &self.bases)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}
