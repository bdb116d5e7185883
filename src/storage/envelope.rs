//! TTL Envelope Module
//!
//! Wraps a payload with its creation time and optional expiration time.

use serde::{Deserialize, Serialize};

// == TTL Envelope ==
/// A payload together with TTL metadata.
///
/// This is also the on-wire shape written to the backend (see [`StoredItem`]):
/// `{"value": ..., "timestamp": ..., "expiresAt": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct TtlEnvelope<T> {
    /// The stored payload. A missing `value` key decodes as `T::default()`.
    #[serde(default)]
    pub value: T,
    /// Creation timestamp (Unix milliseconds). Absent on legacy entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Wire representation of a stored entry.
pub type StoredItem = TtlEnvelope<serde_json::Value>;

impl<T> TtlEnvelope<T> {
    // == Constructor ==
    /// Creates an envelope stamped with the current time.
    ///
    /// # Arguments
    /// * `value` - The payload
    /// * `ttl_ms` - Optional TTL in milliseconds; negative values produce an
    ///   envelope that is already expired
    pub fn new(value: T, ttl_ms: Option<i64>) -> Self {
        let now = current_timestamp_ms();
        Self {
            value,
            timestamp: Some(now),
            expires_at: ttl_ms.map(|ttl| now.saturating_add(ttl)),
        }
    }

    // == Is Expired ==
    /// Checks if the envelope has expired.
    ///
    /// Expired means an expiration time is present and the current time is
    /// strictly past it.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() > expires,
            None => false,
        }
    }

    /// Entries written before TTL metadata existed carry no timestamp.
    pub fn is_legacy(&self) -> bool {
        self.timestamp.is_none()
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the envelope has expired
    /// - `Some(remaining_ms)` if it has a TTL that hasn't elapsed
    /// - `None` if it never expires
    pub fn ttl_remaining_ms(&self) -> Option<i64> {
        self.expires_at
            .map(|expires| (expires - current_timestamp_ms()).max(0))
    }

    /// Consumes the envelope, yielding the payload unless it has expired.
    pub fn into_value(self) -> Option<T> {
        if self.is_expired() {
            None
        } else {
            Some(self.value)
        }
    }
}

// == Free Functions ==
/// Wraps `value` with a TTL of `ttl_ms` milliseconds from now.
pub fn create_ttl_data<T>(value: T, ttl_ms: i64) -> TtlEnvelope<T> {
    TtlEnvelope::new(value, Some(ttl_ms))
}

/// True iff the envelope has an expiration time and it has passed.
pub fn is_ttl_expired<T>(envelope: &TtlEnvelope<T>) -> bool {
    envelope.is_expired()
}

/// Returns the payload, or None if the envelope has expired.
pub fn get_ttl_data<T>(envelope: TtlEnvelope<T>) -> Option<T> {
    envelope.into_value()
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
