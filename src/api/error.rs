//! Failure type shared by every vendor API client.

use std::fmt;

use thiserror::Error;

/// Identifies which upstream endpoint a request went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Apod,
    NeoFeed,
    MarsPhotos,
    Epic,
    IssPosition,
    SolarFlares,
    GeomagneticStorms,
}

impl Endpoint {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Apod => "APOD",
            Self::NeoFeed => "NEO feed",
            Self::MarsPhotos => "Mars rover photos",
            Self::Epic => "EPIC",
            Self::IssPosition => "ISS position",
            Self::SolarFlares => "DONKI FLR",
            Self::GeomagneticStorms => "DONKI GST",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What went wrong while talking to an endpoint.
#[derive(Debug, Error)]
pub enum FetchErrorKind {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("malformed JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("response is missing {0}")]
    MissingData(&'static str),

    #[error("unexpected value for {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
}

/// A vendor API request failed (network, status, or payload).
#[derive(Debug, Error)]
#[error("{endpoint} request failed: {kind}")]
pub struct RemoteFetchError {
    pub endpoint: Endpoint,
    #[source]
    pub kind: FetchErrorKind,
}

impl RemoteFetchError {
    #[must_use]
    pub const fn new(endpoint: Endpoint, kind: FetchErrorKind) -> Self {
        Self { endpoint, kind }
    }

    #[must_use]
    pub const fn timeout(endpoint: Endpoint) -> Self {
        Self::new(endpoint, FetchErrorKind::Timeout)
    }

    #[must_use]
    pub const fn missing(endpoint: Endpoint, what: &'static str) -> Self {
        Self::new(endpoint, FetchErrorKind::MissingData(what))
    }

    #[must_use]
    pub fn invalid(endpoint: Endpoint, field: &'static str, value: impl Into<String>) -> Self {
        Self::new(
            endpoint,
            FetchErrorKind::Invalid {
                field,
                value: value.into(),
            },
        )
    }

    /// Maps a reqwest failure, keeping timeouts distinct.
    ///
    /// The request URL is dropped: NASA calls carry the API key in the query.
    #[must_use]
    pub fn from_reqwest(endpoint: Endpoint, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(endpoint)
        } else {
            Self::new(endpoint, FetchErrorKind::Network(err.without_url()))
        }
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, FetchErrorKind::Timeout)
    }
}

pub type FetchResult<T> = Result<T, RemoteFetchError>;
