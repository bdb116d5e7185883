//! Typed Cache Facades
//!
//! Per-domain caches layered on [`Storage`]. Each domain fixes a logical key,
//! a TTL, a payload type, and a validity key. A cached payload is only handed
//! back when its TTL hasn't elapsed and the stored validity key equals the
//! one the caller asks about.

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::storage::{current_timestamp_ms, KeyValueBackend, Storage};

mod context;
mod location;
mod preferences;
mod weather;

pub use context::{ChatContext, ContextCache, ContextDomain, ContextMessage, MessageRole};
pub use location::{LocationCache, LocationData, LocationDomain};
pub use preferences::{
    Preferences, PreferencesStore, TemperatureUnit, Theme, TimeFormat, DEFAULT_MODEL,
    SELECTED_MODEL, SOUND_ENABLED, THEME, TIME_FORMAT, UNITS, USER_NAME,
};
pub use weather::{Coordinates, WeatherCache, WeatherData, WeatherDomain};

// == Cache Domain ==
/// Static description of one cached domain.
pub trait CacheDomain {
    /// Cached payload
    type Payload: Serialize + DeserializeOwned;
    /// Context the payload was fetched for
    type Validity: Serialize + DeserializeOwned + PartialEq;

    /// Logical storage key
    const KEY: &'static str;
    /// Lifetime of a cached record in minutes
    const TTL_MINUTES: i64;
}

// == Domain Record ==
/// Stored form of a domain cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord<P, V> {
    pub data: P,
    pub validity: V,
    /// When the payload was cached (Unix milliseconds)
    pub cached_at: i64,
}

// == Domain Cache ==
/// Typed view of one domain's record inside a [`Storage`].
pub struct DomainCache<'a, D: CacheDomain, B: KeyValueBackend> {
    storage: &'a mut Storage<B>,
    _domain: PhantomData<D>,
}

impl<'a, D: CacheDomain, B: KeyValueBackend> DomainCache<'a, D, B> {
    pub fn new(storage: &'a mut Storage<B>) -> Self {
        Self {
            storage,
            _domain: PhantomData,
        }
    }

    fn record(&mut self) -> Option<DomainRecord<D::Payload, D::Validity>> {
        self.storage.get(D::KEY)
    }

    /// Caches `payload` as fetched for `validity`.
    pub fn set_cached(&mut self, payload: &D::Payload, validity: D::Validity) -> bool {
        let record = DomainRecord {
            data: payload,
            validity,
            cached_at: current_timestamp_ms(),
        };
        self.storage.set(D::KEY, &record, Some(D::TTL_MINUTES))
    }

    /// Cached payload if its TTL hasn't elapsed, whatever it was fetched for.
    pub fn get_cached(&mut self) -> Option<D::Payload> {
        self.record().map(|r| r.data)
    }

    /// Cached payload if it is live and was fetched for `validity`.
    pub fn get_cached_for(&mut self, validity: &D::Validity) -> Option<D::Payload> {
        self.record()
            .filter(|r| r.validity == *validity)
            .map(|r| r.data)
    }

    /// True if a live record fetched for `validity` exists.
    pub fn is_cache_valid(&mut self, validity: &D::Validity) -> bool {
        self.record()
            .map(|r| r.validity == *validity)
            .unwrap_or(false)
    }

    /// Age of the live cached record in milliseconds.
    pub fn age_ms(&mut self) -> Option<i64> {
        self.record()
            .map(|r| (current_timestamp_ms() - r.cached_at).max(0))
    }

    pub fn clear_cached(&mut self) -> bool {
        self.storage.remove(D::KEY)
    }
}
