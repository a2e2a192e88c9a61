//! Near-Earth Object feed.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;

use super::client::ApiClient;
use super::error::{Endpoint, FetchResult};

/// A near-Earth object approaching on the requested day.
#[derive(Debug, Clone, PartialEq)]
pub struct NearEarthObject {
    pub name: String,
    pub hazardous: bool,
    /// Miss distance of the first listed close approach.
    pub miss_distance_km: Option<f64>,
    /// Upper bound of the estimated diameter.
    pub diameter_max_m: f64,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    near_earth_objects: HashMap<String, Vec<RawObject>>,
}

#[derive(Debug, Deserialize)]
struct RawObject {
    name: String,
    #[serde(default)]
    is_potentially_hazardous_asteroid: bool,
    #[serde(default)]
    close_approach_data: Vec<RawApproach>,
    estimated_diameter: RawDiameter,
}

#[derive(Debug, Deserialize)]
struct RawApproach {
    miss_distance: RawMissDistance,
}

// The feed encodes distances as strings.
#[derive(Debug, Deserialize)]
struct RawMissDistance {
    kilometers: String,
}

#[derive(Debug, Deserialize)]
struct RawDiameter {
    meters: RawRange,
}

#[derive(Debug, Deserialize)]
struct RawRange {
    estimated_diameter_max: f64,
}

impl From<RawObject> for NearEarthObject {
    fn from(raw: RawObject) -> Self {
        let miss_distance_km = raw
            .close_approach_data
            .first()
            .and_then(|approach| approach.miss_distance.kilometers.trim().parse().ok());

        Self {
            name: raw.name,
            hazardous: raw.is_potentially_hazardous_asteroid,
            miss_distance_km,
            diameter_max_m: raw.estimated_diameter.meters.estimated_diameter_max,
        }
    }
}

fn objects_on(feed: FeedResponse, date: NaiveDate) -> Vec<NearEarthObject> {
    let key = date.format("%Y-%m-%d").to_string();
    feed.near_earth_objects
        .into_iter()
        .find(|(day, _)| *day == key)
        .map(|(_, objects)| objects.into_iter().map(NearEarthObject::from).collect())
        .unwrap_or_default()
}

impl ApiClient {
    /// Fetches the objects approaching Earth on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, timeout, non-2xx or bad JSON.
    pub async fn fetch_neo_feed(&self, date: NaiveDate) -> FetchResult<Vec<NearEarthObject>> {
        let day = date.format("%Y-%m-%d").to_string();
        let query = [
            ("start_date", day.clone()),
            ("end_date", day),
            ("api_key", self.api_key().to_owned()),
        ];

        let feed: FeedResponse = self
            .get_json(
                Endpoint::NeoFeed,
                &self.nasa_url("/neo/rest/v1/feed"),
                &query,
                self.timeouts.standard,
            )
            .await?;

        Ok(objects_on(feed, date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"{
        "element_count": 2,
        "near_earth_objects": {
            "2024-05-01": [
                {
                    "name": "(2020 AB)",
                    "is_potentially_hazardous_asteroid": true,
                    "estimated_diameter": {"meters": {"estimated_diameter_min": 10.0, "estimated_diameter_max": 22.5}},
                    "close_approach_data": [{"miss_distance": {"kilometers": "1234567.891"}}]
                },
                {
                    "name": "(2021 CD)",
                    "is_potentially_hazardous_asteroid": false,
                    "estimated_diameter": {"meters": {"estimated_diameter_min": 1.0, "estimated_diameter_max": 3.0}},
                    "close_approach_data": []
                }
            ]
        }
    }"#;

    #[test]
    fn test_objects_on_date() {
        let feed: FeedResponse = serde_json::from_str(FEED).unwrap();
        let objects = objects_on(feed, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "(2020 AB)");
        assert!(objects[0].hazardous);
        assert_eq!(objects[0].miss_distance_km, Some(1_234_567.891));
        assert!((objects[0].diameter_max_m - 22.5).abs() < f64::EPSILON);
        assert_eq!(objects[1].miss_distance_km, None);
    }

    #[test]
    fn test_other_date_is_empty() {
        let feed: FeedResponse = serde_json::from_str(FEED).unwrap();
        assert!(objects_on(feed, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()).is_empty());
    }
}
