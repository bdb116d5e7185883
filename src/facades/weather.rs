//! Weather cache: current conditions keyed by the coordinates they were
//! fetched for.

use serde::{Deserialize, Serialize};

use super::{CacheDomain, DomainCache};

/// Latitude/longitude pair. Cache validity compares these exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Current conditions as shown by the weather widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub city_name: Option<String>,
}

pub struct WeatherDomain;

impl CacheDomain for WeatherDomain {
    type Payload = WeatherData;
    type Validity = Coordinates;

    const KEY: &'static str = "weatherCache";
    const TTL_MINUTES: i64 = 10;
}

/// Weather cache over a borrowed store.
pub type WeatherCache<'a, B> = DomainCache<'a, WeatherDomain, B>;
