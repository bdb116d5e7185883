//! Storage introspection for development builds.

use serde::Serialize;
use tracing::{info, info_span};

use crate::config::Environment;
use crate::storage::{KeyValueBackend, Storage};

/// One namespaced entry as seen by the debug dump.
#[derive(Debug, Clone, Serialize)]
pub struct DebugEntry {
    pub key: String,
    /// Stored payload, `None` if the entry can't be decoded
    pub value: Option<serde_json::Value>,
    pub size: usize,
    pub expires_at: Option<i64>,
}

/// Collects every namespaced entry without evaluating TTLs.
///
/// Entries come back sorted by key.
pub fn snapshot<B: KeyValueBackend>(storage: &Storage<B>) -> Vec<DebugEntry> {
    let mut keys = storage.keys();
    keys.sort();

    keys.into_iter()
        .map(|key| {
            let item = storage.inspect(&key);
            DebugEntry {
                size: storage.get_size(&key),
                value: item.as_ref().map(|i| i.value.clone()),
                expires_at: item.and_then(|i| i.expires_at),
                key,
            }
        })
        .collect()
}

/// Dumps every namespaced entry to the log, grouped under one span.
///
/// Does nothing in production. Returns the number of entries logged.
pub fn log_all<B: KeyValueBackend>(storage: &Storage<B>, environment: Environment) -> usize {
    if environment.is_production() {
        return 0;
    }

    let entries = snapshot(storage);
    let total_size: usize = entries.iter().map(|e| e.size).sum();

    let span = info_span!("storage_dump", prefix = storage.prefix());
    let _guard = span.enter();

    info!(entries = entries.len(), total_size, "Storage contents");
    for entry in &entries {
        let value = entry
            .value
            .as_ref()
            .and_then(|v| serde_json::to_string_pretty(v).ok())
            .unwrap_or_else(|| "<unreadable>".to_string());
        info!(
            key = %entry.key,
            size = entry.size,
            expires_at = ?entry.expires_at,
            "\n{}",
            value
        );
    }

    entries.len()
}
