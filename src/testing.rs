//! In-memory fakes for the transport and data-source seams.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::api::{
    Apod, Endpoint, EpicImage, FetchResult, IssPosition, KpReading, MediaKind, NearEarthObject,
    RemoteFetchError, RoverCamera, RoverInfo, RoverPhoto, SolarFlare, SpaceFeeds, StormSummary,
};
use crate::telegram::{ChatId, Messenger, Outgoing, TransportError};

/// Records every delivery; refuses chats listed in `failing`.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(ChatId, Outgoing)>>,
    acknowledged: Mutex<Vec<String>>,
    failing: HashSet<ChatId>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(chats: impl IntoIterator<Item = ChatId>) -> Self {
        Self {
            failing: chats.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(ChatId, Outgoing)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<Outgoing> {
        self.sent()
            .into_iter()
            .filter(|(chat, _)| *chat == chat_id)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn acknowledged(&self) -> Vec<String> {
        self.acknowledged.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn deliver(&self, chat_id: ChatId, message: &Outgoing) -> Result<(), TransportError> {
        if self.failing.contains(&chat_id) {
            return Err(TransportError::Api {
                method: "sendMessage",
                code: 403,
                description: "Forbidden: bot was blocked by the user".to_owned(),
            });
        }
        self.sent.lock().unwrap().push((chat_id, message.clone()));
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError> {
        self.acknowledged.lock().unwrap().push(callback_id.to_owned());
        Ok(())
    }
}

/// Canned data for every feed; endpoints listed in `failing` time out.
#[derive(Debug)]
pub struct FakeFeeds {
    pub apod: Apod,
    pub neo: Vec<NearEarthObject>,
    pub photos: Vec<RoverPhoto>,
    pub epic: Option<EpicImage>,
    pub iss: IssPosition,
    pub flares: Vec<SolarFlare>,
    pub storm: Option<StormSummary>,
    failing: HashSet<Endpoint>,
    calls: Mutex<Vec<Endpoint>>,
    apod_dates: Mutex<Vec<Option<NaiveDate>>>,
}

impl FakeFeeds {
    pub fn healthy() -> Self {
        let earth_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let photo = |id| RoverPhoto {
            id,
            img_src: format!("https://mars.example/{id}.jpg"),
            earth_date,
            camera: RoverCamera {
                name: "NAVCAM_LEFT".to_owned(),
                full_name: "Navigation Camera - Left".to_owned(),
            },
            rover: RoverInfo {
                name: "Perseverance".to_owned(),
            },
        };

        Self {
            apod: Apod {
                title: "Orion Nebula".to_owned(),
                explanation: "A stellar nursery.".to_owned(),
                url: "https://apod.example/orion.jpg".to_owned(),
                media_type: MediaKind::Image,
                date: None,
                copyright: None,
            },
            neo: vec![NearEarthObject {
                name: "(2024 AB)".to_owned(),
                hazardous: false,
                miss_distance_km: Some(4_500_000.0),
                diameter_max_m: 42.0,
            }],
            photos: vec![photo(10), photo(30), photo(20), photo(5)],
            epic: Some(EpicImage {
                image_url: "https://epic.example/1.png".to_owned(),
                taken_at: NaiveDateTime::parse_from_str("2024-06-10 00:13:03", "%Y-%m-%d %H:%M:%S")
                    .unwrap(),
                caption: "Earth".to_owned(),
            }),
            iss: IssPosition {
                latitude: 10.0,
                longitude: 20.0,
                observed_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                altitude_km: Some(420.0),
                velocity_kmh: Some(27_600.0),
            },
            flares: Vec::new(),
            storm: Some(StormSummary {
                storm_count: 1,
                latest: KpReading {
                    observed_at: Utc.with_ymd_and_hms(2024, 5, 10, 21, 0, 0).unwrap(),
                    kp_index: 5.33,
                    source: None,
                },
            }),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
            apod_dates: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing(mut self, endpoint: Endpoint) -> Self {
        self.failing.insert(endpoint);
        self
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().unwrap().clone()
    }

    pub fn apod_dates(&self) -> Vec<Option<NaiveDate>> {
        self.apod_dates.lock().unwrap().clone()
    }

    fn respond<T: Clone>(&self, endpoint: Endpoint, value: &T) -> FetchResult<T> {
        self.calls.lock().unwrap().push(endpoint);
        if self.failing.contains(&endpoint) {
            return Err(RemoteFetchError::timeout(endpoint));
        }
        Ok(value.clone())
    }
}

#[async_trait]
impl SpaceFeeds for FakeFeeds {
    async fn apod(&self, date: Option<NaiveDate>) -> FetchResult<Apod> {
        self.apod_dates.lock().unwrap().push(date);
        self.respond(Endpoint::Apod, &self.apod)
    }

    async fn near_earth_objects(&self, _date: NaiveDate) -> FetchResult<Vec<NearEarthObject>> {
        self.respond(Endpoint::NeoFeed, &self.neo)
    }

    async fn mars_photos(&self) -> FetchResult<Vec<RoverPhoto>> {
        self.respond(Endpoint::MarsPhotos, &self.photos)
    }

    async fn epic_latest(&self) -> FetchResult<Option<EpicImage>> {
        self.respond(Endpoint::Epic, &self.epic)
    }

    async fn iss_position(&self) -> FetchResult<IssPosition> {
        self.respond(Endpoint::IssPosition, &self.iss)
    }

    async fn solar_flares(&self, _date: NaiveDate) -> FetchResult<Vec<SolarFlare>> {
        self.respond(Endpoint::SolarFlares, &self.flares)
    }

    async fn storm_summary(&self, _date: NaiveDate) -> FetchResult<Option<StormSummary>> {
        self.respond(Endpoint::GeomagneticStorms, &self.storm)
    }
}
