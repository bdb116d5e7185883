//! Location cache: IP geolocation results keyed by the address looked up.

use serde::{Deserialize, Serialize};

use super::{CacheDomain, Coordinates, DomainCache};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub coordinates: Coordinates,
    pub city: String,
    pub region: Option<String>,
    pub country: String,
    pub timezone: Option<String>,
}

pub struct LocationDomain;

impl CacheDomain for LocationDomain {
    type Payload = LocationData;
    /// IP address the lookup was made for
    type Validity = String;

    const KEY: &'static str = "locationCache";
    const TTL_MINUTES: i64 = 30;
}

pub type LocationCache<'a, B> = DomainCache<'a, LocationDomain, B>;
