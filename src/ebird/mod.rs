/// eBird API client and the wire types it returns
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::TwitcherError;

pub const DEFAULT_API_URL: &str = "https://api.ebird.org";

/// One observation as the service reports it. Only the fields we use;
/// anything else in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sighting {
    pub com_name: String,
    pub species_code: String,
    #[serde(default)]
    pub loc_id: String,
    #[serde(default)]
    pub loc_name: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    #[serde(default)]
    pub location_private: bool,
}

/// Where and how far back to search
#[derive(Debug, Clone, Copy)]
pub struct SearchArea {
    pub lat: f64,
    pub lng: f64,
    pub days_back: u32,
    pub dist_km: u32,
}

/// The two read operations the pipeline needs. `EbirdClient` talks to the
/// real service; tests drive the pipeline with stubs.
pub trait ObservationSource {
    /// Recent sightings of any species near a coordinate. An empty list is
    /// a valid "no data" answer.
    fn recent_sightings(&self, area: &SearchArea) -> crate::Result<Vec<Sighting>>;

    /// Recent sightings of one species near a coordinate.
    fn sightings_for_species(&self, code: &str, area: &SearchArea)
        -> crate::Result<Vec<Sighting>>;
}

pub struct EbirdClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl EbirdClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> crate::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("twitcher/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| TwitcherError::Api(format!("building HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn get_once(&self, url: &str, area: &SearchArea) -> crate::Result<Vec<Sighting>> {
        let response = self
            .client
            .get(url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("lat", &area.lat.to_string()),
                ("lng", &area.lng.to_string()),
                ("back", &area.days_back.to_string()),
                ("dist", &area.dist_km.to_string()),
            ])
            .send()
            .map_err(|e| TwitcherError::Api(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TwitcherError::Api(format!("{} returned {}", url, status)));
        }
        response
            .json::<Vec<Sighting>>()
            .map_err(|e| TwitcherError::Api(format!("bad response body from {}: {}", url, e)))
    }

    /// One automatic retry on any failure before giving up
    fn get_with_retry(&self, url: &str, area: &SearchArea) -> crate::Result<Vec<Sighting>> {
        debug!("GET {}", url);
        match self.get_once(url, area) {
            Ok(sightings) => Ok(sightings),
            Err(first) => {
                warn!("{} — retrying once", first);
                self.get_once(url, area)
            }
        }
    }
}

impl ObservationSource for EbirdClient {
    fn recent_sightings(&self, area: &SearchArea) -> crate::Result<Vec<Sighting>> {
        let url = format!("{}/v2/data/obs/geo/recent", self.base_url);
        self.get_with_retry(&url, area)
    }

    fn sightings_for_species(
        &self,
        code: &str,
        area: &SearchArea,
    ) -> crate::Result<Vec<Sighting>> {
        let url = format!("{}/v2/data/obs/geo/recent/{}", self.base_url, code);
        self.get_with_retry(&url, area)
    }
}
