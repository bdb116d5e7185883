//! Storage Module
//!
//! Namespaced, TTL-aware key-value store on top of a [`KeyValueBackend`].
//! No operation here returns an error or panics: backend and serializer
//! failures are reported to the injected [`StorageLogger`] and turned into
//! `false`/`None` results.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::DEFAULT_PREFIX;
use crate::error::StorageError;
use crate::storage::backend::{KeyValueBackend, MemoryBackend};
use crate::storage::envelope::{StoredItem, TtlEnvelope};
use crate::storage::logger::{StorageLogger, TracingLogger};
use crate::storage::serializer;
use crate::storage::stats::StorageStats;

const MS_PER_MINUTE: i64 = 60_000;

// == Storage ==
/// Key-value store confined to one key prefix of a shared backend.
pub struct Storage<B: KeyValueBackend = MemoryBackend> {
    /// Underlying key-value medium
    backend: B,
    /// Prepended to every logical key
    prefix: String,
    /// Receives every absorbed failure
    logger: Arc<dyn StorageLogger>,
    /// Read/expiry/failure counters
    stats: StorageStats,
}

impl<B: KeyValueBackend> Storage<B> {
    // == Constructors ==
    /// Creates a store using the default `virgil_` namespace and a tracing logger.
    pub fn new(backend: B) -> Self {
        Self::with_prefix(backend, DEFAULT_PREFIX)
    }

    /// Creates a store confined to `prefix`.
    pub fn with_prefix(backend: B, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
            logger: Arc::new(TracingLogger),
            stats: StorageStats::new(),
        }
    }

    /// Replaces the failure logger.
    pub fn with_logger(mut self, logger: Arc<dyn StorageLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn stats(&self) -> StorageStats {
        self.stats.clone()
    }

    fn physical_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn log_failure(&self, operation: &str, key: &str, err: &StorageError) {
        self.logger.error(
            &format!("Storage {} failed for key '{}'", operation, key),
            err,
        );
    }

    fn fail(&mut self, operation: &str, key: &str, err: &StorageError) {
        self.stats.record_failure();
        self.log_failure(operation, key, err);
    }

    // == Set ==
    /// Stores `value` under `key`, optionally expiring after `expiration_minutes`.
    ///
    /// `None` and `Some(0)` both mean "never expires". Negative minutes
    /// produce an entry that is already expired.
    ///
    /// Returns `false` if the value can't be serialized or the backend
    /// rejects the write (quota, access).
    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
        expiration_minutes: Option<i64>,
    ) -> bool {
        let ttl_ms = expiration_minutes
            .filter(|minutes| *minutes != 0)
            .map(|minutes| minutes.saturating_mul(MS_PER_MINUTE));

        let raw = match serializer::serialize(&TtlEnvelope::new(value, ttl_ms)) {
            Ok(raw) => raw,
            Err(e) => {
                self.fail("set", key, &e);
                return false;
            }
        };

        match self.backend.set_item(&self.physical_key(key), raw) {
            Ok(()) => true,
            Err(e) => {
                self.fail("set", key, &e);
                false
            }
        }
    }

    // == Get ==
    /// Returns the live value stored under `key`.
    ///
    /// Absent, corrupted, undecodable, and expired entries all read as
    /// `None`. Expired entries are deleted as a side effect. Entries without
    /// a `timestamp` predate TTL metadata and are always returned.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let raw = match self.backend.get_item(&self.physical_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.stats.record_miss();
                return None;
            }
            Err(e) => {
                self.fail("get", key, &e);
                self.stats.record_miss();
                return None;
            }
        };

        let item: StoredItem = match serializer::deserialize(&raw) {
            Ok(item) => item,
            Err(e) => {
                self.fail("get", key, &e);
                self.stats.record_miss();
                return None;
            }
        };

        if !item.is_legacy() && item.is_expired() {
            debug!(key = %key, "Removing expired entry on read");
            self.stats.record_expiration();
            self.stats.record_miss();
            self.remove(key);
            return None;
        }

        match serializer::from_value(item.value) {
            Ok(value) => {
                self.stats.record_hit();
                Some(value)
            }
            Err(e) => {
                self.fail("get", key, &e);
                self.stats.record_miss();
                None
            }
        }
    }

    /// Like [`Storage::get`], falling back to `default` on any miss.
    pub fn get_or<T: DeserializeOwned>(&mut self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    // == Inspect ==
    /// Reads the stored item for `key` without evaluating its TTL.
    ///
    /// No side effects: expired entries are neither deleted nor counted.
    pub fn inspect(&self, key: &str) -> Option<StoredItem> {
        let raw = match self.backend.get_item(&self.physical_key(key)) {
            Ok(raw) => raw?,
            Err(e) => {
                self.log_failure("inspect", key, &e);
                return None;
            }
        };

        match serializer::deserialize(&raw) {
            Ok(item) => Some(item),
            Err(e) => {
                self.log_failure("inspect", key, &e);
                None
            }
        }
    }

    /// Returns the stored value regardless of expiry.
    pub fn peek<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let item = self.inspect(key)?;
        match serializer::from_value(item.value) {
            Ok(value) => Some(value),
            Err(e) => {
                self.log_failure("peek", key, &e);
                None
            }
        }
    }

    // == Remove ==
    /// Deletes `key`. Removing an absent key succeeds.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.backend.remove_item(&self.physical_key(key)) {
            Ok(()) => true,
            Err(e) => {
                self.fail("remove", key, &e);
                false
            }
        }
    }

    // == Clear ==
    /// Deletes every key in this namespace, leaving other keys untouched.
    ///
    /// Keeps going after a failed deletion; returns `false` if any failed.
    pub fn clear(&mut self) -> bool {
        let physical_keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                self.fail("clear", "*", &e);
                return false;
            }
        };

        let owned: Vec<String> = physical_keys
            .into_iter()
            .filter(|k| k.starts_with(&self.prefix))
            .collect();

        let mut all_removed = true;
        for physical in owned {
            if let Err(e) = self.backend.remove_item(&physical) {
                let logical = physical[self.prefix.len()..].to_string();
                self.fail("clear", &logical, &e);
                all_removed = false;
            }
        }
        all_removed
    }

    // == Has ==
    /// True if anything is stored under `key`, expired or not.
    pub fn has(&self, key: &str) -> bool {
        match self.backend.get_item(&self.physical_key(key)) {
            Ok(raw) => raw.is_some(),
            Err(e) => {
                self.log_failure("has", key, &e);
                false
            }
        }
    }

    // == Keys ==
    /// Logical keys in this namespace, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        match self.backend.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(self.prefix.as_str()).map(str::to_string))
                .collect(),
            Err(e) => {
                self.log_failure("keys", "*", &e);
                Vec::new()
            }
        }
    }

    // == Sizes ==
    /// Byte length of the stored text for `key`, 0 if absent.
    pub fn get_size(&self, key: &str) -> usize {
        match self.backend.get_item(&self.physical_key(key)) {
            Ok(raw) => raw.map(|r| r.len()).unwrap_or(0),
            Err(e) => {
                self.log_failure("get_size", key, &e);
                0
            }
        }
    }

    /// Sum of [`Storage::get_size`] over every key in the namespace.
    pub fn get_total_size(&self) -> usize {
        self.keys().iter().map(|k| self.get_size(k)).sum()
    }

    // == Sweep Expired ==
    /// Removes every expired entry in the namespace without waiting for a read.
    ///
    /// Legacy and unreadable entries are left in place. Returns the number
    /// of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .keys()
            .into_iter()
            .filter(|k| {
                self.inspect(k)
                    .map(|item| !item.is_legacy() && item.is_expired())
                    .unwrap_or(false)
            })
            .collect();

        let mut removed = 0;
        for key in expired {
            if self.remove(&key) {
                self.stats.record_expiration();
                removed += 1;
            }
        }
        removed
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::{FlakyBackend, RecordingLogger};
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};

    fn store() -> Storage {
        Storage::new(MemoryBackend::new())
    }

    fn recorded_store(backend: FlakyBackend) -> (Storage<FlakyBackend>, Arc<RecordingLogger>) {
        let logger = Arc::new(RecordingLogger::default());
        let storage = Storage::new(backend).with_logger(logger.clone());
        (storage, logger)
    }

    #[test]
    fn test_set_and_get() {
        let mut storage = store();

        assert!(storage.set("userProfile", "alice", None));
        assert_eq!(storage.get::<String>("userProfile"), Some("alice".to_string()));
    }

    #[test]
    fn test_physical_key_is_prefixed() {
        let mut storage = store();
        storage.set("theme", "dark", None);

        let backend = storage.backend();
        assert!(backend.get_item("virgil_theme").unwrap().is_some());
        assert!(backend.get_item("theme").unwrap().is_none());
    }

    #[test]
    fn test_wire_format() {
        let mut storage = store();
        storage.set("n", &7, Some(1));

        let raw = storage.backend().get_item("virgil_n").unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["value"], json!(7));
        let timestamp = parsed["timestamp"].as_i64().unwrap();
        assert_eq!(parsed["expiresAt"].as_i64().unwrap(), timestamp + 60_000);
    }

    #[test]
    fn test_zero_minutes_means_no_expiry() {
        let mut storage = store();
        storage.set("k", "v", Some(0));

        let item = storage.inspect("k").unwrap();
        assert!(item.expires_at.is_none());
    }

    #[test]
    fn test_get_missing_returns_none_and_default() {
        let mut storage = store();

        assert_eq!(storage.get::<String>("missing"), None);
        assert_eq!(storage.get_or("missing", "fallback".to_string()), "fallback");
    }

    #[test]
    fn test_null_and_unit_values() {
        let mut storage = store();

        assert!(storage.set("nothing", &None::<u32>, None));
        assert_eq!(storage.get::<Option<u32>>("nothing"), Some(None));

        assert!(storage.set("unit", &(), None));
        assert_eq!(storage.get::<()>("unit"), Some(()));
    }

    #[test]
    fn test_nested_values() {
        let mut storage = store();
        let mut value = BTreeMap::new();
        value.insert("ids".to_string(), vec![vec![1, 2], vec![3]]);

        storage.set("nested", &value, None);
        assert_eq!(storage.get("nested"), Some(value));
    }

    #[test]
    fn test_missing_value_key_reads_as_unit() {
        let mut storage = store();
        storage
            .backend_mut()
            .set_item("virgil_undef", r#"{"timestamp":1}"#.to_string())
            .unwrap();

        assert_eq!(storage.get::<()>("undef"), Some(()));
        assert_eq!(storage.get::<Option<String>>("undef"), Some(None));
    }

    #[test]
    fn test_unserializable_value_returns_false() {
        let (mut storage, logger) = recorded_store(FlakyBackend::default());
        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple keys are not JSON");

        assert!(!storage.set("bad", &bad, None));
        assert_eq!(logger.count(), 1);
        assert!(!storage.has("bad"));
    }

    #[test]
    fn test_lazy_expiry_side_effect() {
        let mut storage = store();
        assert!(storage.set("stale", "v", Some(-1)));

        assert!(storage.has("stale"));
        assert_eq!(storage.get::<String>("stale"), None);
        assert!(!storage.has("stale"));
        assert_eq!(storage.stats().expirations, 1);
    }

    #[test]
    fn test_expired_returns_default() {
        let mut storage = store();
        storage.set("stale", "v", Some(-1));

        assert_eq!(storage.get_or("stale", "fresh".to_string()), "fresh");
    }

    #[test]
    fn test_legacy_entry_is_always_valid() {
        let mut storage = store();
        let past = chrono::Utc::now().timestamp_millis() - 10_000;
        storage
            .backend_mut()
            .set_item(
                "virgil_old",
                format!(r#"{{"value":"kept","expiresAt":{}}}"#, past),
            )
            .unwrap();

        assert_eq!(storage.get::<String>("old"), Some("kept".to_string()));
        assert!(storage.has("old"));
    }

    #[test]
    fn test_corrupted_entry_logs_once() {
        let (mut storage, logger) = recorded_store(FlakyBackend::default());
        storage
            .backend_mut()
            .set_item("virgil_broken", "{{{ not json".to_string())
            .unwrap();

        assert_eq!(storage.get_or("broken", "fallback".to_string()), "fallback");
        assert_eq!(logger.count(), 1);
        assert!(logger.messages()[0].contains("'broken'"));
    }

    #[test]
    fn test_type_mismatch_reads_as_miss() {
        let (mut storage, logger) = recorded_store(FlakyBackend::default());
        storage.set("count", "not a number", None);

        assert_eq!(storage.get::<u32>("count"), None);
        assert_eq!(logger.count(), 1);
    }

    #[test]
    fn test_quota_failure_returns_false() {
        let (mut storage, logger) = recorded_store(FlakyBackend::default());
        storage.backend_mut().fail_writes = true;

        assert!(!storage.set("big", "payload", None));
        assert_eq!(logger.count(), 1);
        assert_eq!(storage.get_or("big", "default".to_string()), "default");
        assert_eq!(storage.stats().failures, 1);
    }

    #[test]
    fn test_quota_from_memory_backend() {
        let mut storage = Storage::new(MemoryBackend::with_quota(64));

        assert!(storage.set("small", "ok", None));
        assert!(!storage.set("large", &"x".repeat(128), None));
        assert_eq!(storage.get::<String>("small"), Some("ok".to_string()));
    }

    #[test]
    fn test_read_failure_returns_default() {
        let (mut storage, logger) = recorded_store(FlakyBackend::default());
        storage.set("k", "v", None);
        storage.backend_mut().fail_reads = true;

        assert_eq!(storage.get_or("k", "default".to_string()), "default");
        assert!(!storage.has("k"));
        assert_eq!(storage.get_size("k"), 0);
        assert_eq!(logger.count(), 3);
    }

    #[test]
    fn test_remove() {
        let mut storage = store();
        storage.set("k", "v", None);

        assert!(storage.remove("k"));
        assert!(!storage.has("k"));
        assert!(storage.remove("k"), "removing an absent key succeeds");
    }

    #[test]
    fn test_remove_failure_returns_false() {
        let (mut storage, logger) = recorded_store(FlakyBackend::default());
        storage.set("k", "v", None);
        storage.backend_mut().fail_removes.insert("virgil_k".to_string());

        assert!(!storage.remove("k"));
        assert!(storage.has("k"));
        assert_eq!(logger.count(), 1);
    }

    #[test]
    fn test_clear_respects_namespace() {
        let mut storage = store();
        storage.set("a", &1, None);
        storage.set("b", &2, None);
        storage
            .backend_mut()
            .set_item("other_app_key", "untouched".to_string())
            .unwrap();

        assert!(storage.clear());
        assert!(!storage.has("a"));
        assert!(!storage.has("b"));
        assert!(storage.keys().is_empty());
        assert_eq!(
            storage.backend().get_item("other_app_key").unwrap(),
            Some("untouched".to_string())
        );
    }

    #[test]
    fn test_clear_continues_after_failure() {
        let (mut storage, logger) = recorded_store(FlakyBackend::default());
        storage.set("a", &1, None);
        storage.set("b", &2, None);
        storage.set("c", &3, None);
        storage.backend_mut().fail_removes.insert("virgil_b".to_string());

        assert!(!storage.clear());
        assert_eq!(storage.keys(), vec!["b".to_string()]);
        assert_eq!(logger.count(), 1);
    }

    #[test]
    fn test_clear_enumeration_failure() {
        let (mut storage, logger) = recorded_store(FlakyBackend::default());
        storage.set("a", &1, None);
        storage.backend_mut().fail_keys = true;

        assert!(!storage.clear());
        assert!(storage.keys().is_empty());
        assert_eq!(logger.count(), 2);
    }

    #[test]
    fn test_keys_strip_prefix() {
        let mut storage = store();
        storage.set("one", &1, None);
        storage.set("two", &2, None);
        storage
            .backend_mut()
            .set_item("foreign", "x".to_string())
            .unwrap();

        let mut keys = storage.keys();
        keys.sort();
        assert_eq!(keys, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_separate_namespaces_share_backend() {
        let mut first = Storage::with_prefix(MemoryBackend::new(), "app_a_");
        first.set("k", "a", None);

        let mut second = Storage::with_prefix(first.backend().clone(), "app_b_");
        second.set("k", "b", None);
        assert!(second.clear());

        assert_eq!(second.keys().len(), 0);
        assert!(second.backend().get_item("app_a_k").unwrap().is_some());
    }

    #[test]
    fn test_sizes() {
        let mut storage = store();
        assert_eq!(storage.get_size("none"), 0);

        storage.set("a", "short", None);
        storage.set("b", &vec![1, 2, 3, 4, 5], Some(10));

        let raw = storage.backend().get_item("virgil_a").unwrap().unwrap();
        assert_eq!(storage.get_size("a"), raw.len());
        assert_eq!(
            storage.get_total_size(),
            storage.get_size("a") + storage.get_size("b")
        );
    }

    #[test]
    fn test_peek_ignores_expiry() {
        let mut storage = store();
        storage.set("stale", "still here", Some(-1));

        assert_eq!(storage.peek::<String>("stale"), Some("still here".to_string()));
        assert!(storage.has("stale"));
    }

    #[test]
    fn test_sweep_expired() {
        let mut storage = store();
        storage.set("stale1", "v", Some(-1));
        storage.set("stale2", "v", Some(-5));
        storage.set("fresh", "v", Some(10));
        storage.set("forever", "v", None);

        assert_eq!(storage.sweep_expired(), 2);
        let mut keys = storage.keys();
        keys.sort();
        assert_eq!(keys, vec!["forever".to_string(), "fresh".to_string()]);
    }

    #[test]
    fn test_stats_track_reads() {
        let mut storage = store();
        storage.set("k", "v", None);
        storage.get::<String>("k");
        storage.get::<String>("missing");

        let stats = storage.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
