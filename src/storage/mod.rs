//! Storage Module
//!
//! Namespaced key-value storage with TTL envelopes over a pluggable backend.

mod backend;
mod debug;
mod envelope;
mod logger;
pub mod serializer;
mod stats;
mod store;


// Re-export public types
pub use backend::{DynBackend, FileBackend, KeyValueBackend, MemoryBackend};
pub use debug::{log_all, snapshot, DebugEntry};
pub use envelope::{
    create_ttl_data, current_timestamp_ms, get_ttl_data, is_ttl_expired, StoredItem, TtlEnvelope,
};
pub use logger::{StorageLogger, TracingLogger};
pub use stats::StorageStats;
pub use store::Storage;
