//! EPIC natural-colour Earth imagery.

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::client::ApiClient;
use super::error::{Endpoint, FetchResult, RemoteFetchError};

/// The most recent full-disc Earth image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicImage {
    /// Archive PNG URL (carries the API key).
    pub image_url: String,
    /// Capture time, UTC.
    pub taken_at: NaiveDateTime,
    pub caption: String,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    image: String,
    date: String,
    #[serde(default)]
    caption: String,
}

fn parse_epic_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

impl ApiClient {
    /// Fetches the first image of the latest natural-colour set.
    ///
    /// Returns `Ok(None)` when the set is empty.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, timeout, non-2xx, bad JSON or an
    /// unparseable capture time.
    pub async fn fetch_epic_latest(&self) -> FetchResult<Option<EpicImage>> {
        let query = [("api_key", self.api_key().to_owned())];
        let images: Vec<RawImage> = self
            .get_json(
                Endpoint::Epic,
                &self.nasa_url("/EPIC/api/natural/images"),
                &query,
                self.timeouts.standard,
            )
            .await?;

        let Some(first) = images.into_iter().next() else {
            return Ok(None);
        };

        let taken_at = parse_epic_time(&first.date)
            .ok_or_else(|| RemoteFetchError::invalid(Endpoint::Epic, "date", &first.date))?;

        let image_url = format!(
            "{}/EPIC/archive/natural/{}/png/{}.png?api_key={}",
            self.bases.nasa,
            taken_at.format("%Y/%m/%d"),
            first.image,
            self.api_key()
        );

        Ok(Some(EpicImage {
            image_url,
            taken_at,
            caption: first.caption,
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_parse_epic_time() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(0, 13, 3)
            .unwrap();
        assert_eq!(parse_epic_time("2024-06-10 00:13:03"), Some(expected));
        assert_eq!(parse_epic_time("2024-06-10T00:13:03"), Some(expected));
        assert_eq!(parse_epic_time("yesterday"), None);
    }
}
