//! Virgil Storage - Namespaced, TTL-aware key-value cache
//!
//! Typed cache facades over a prefixed key-value store with lazy expiration,
//! plus a small HTTP server for inspecting a namespace during development.

pub mod api;
pub mod config;
pub mod error;
pub mod facades;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use config::{Config, Environment};
pub use storage::{KeyValueBackend, MemoryBackend, Storage};
pub use tasks::spawn_sweep_task;
