//! Configuration Module
//!
//! Loads storage and inspection server settings from environment variables.

use std::env;
use std::path::PathBuf;

/// Default namespace prefix applied to every logical key.
pub const DEFAULT_PREFIX: &str = "virgil_";

/// Default backend quota, matching the usual browser local storage ceiling.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

// == Environment ==
/// Build flavour; only the debug dump looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parses `production`/`prod` and `development`/`dev` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Some(Environment::Production),
            "development" | "dev" => Some(Environment::Development),
            _ => None,
        }
    }

    /// Environment implied by the compilation profile.
    pub fn from_build() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Storage configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace prefix for physical keys
    pub prefix: String,
    /// Path of the JSON file backing the store
    pub data_path: PathBuf,
    /// Backend capacity in bytes, None = unlimited
    pub quota_bytes: Option<usize>,
    /// HTTP server port
    pub server_port: u16,
    /// Expired-entry sweep interval in seconds, 0 = lazy expiration only
    pub sweep_interval: u64,
    /// Build flavour controlling the debug dump
    pub environment: Environment,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `VIRGIL_STORAGE_PREFIX` - Key namespace prefix (default: `virgil_`)
    /// - `VIRGIL_STORAGE_PATH` - Backing file (default: `virgil-storage.json`)
    /// - `VIRGIL_STORAGE_QUOTA` - Quota in bytes, 0 disables (default: 5 MiB)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds, 0 disables (default: 0)
    /// - `VIRGIL_ENV` - `production` or `development` (default: build profile)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let quota_bytes = match env::var("VIRGIL_STORAGE_QUOTA")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            Some(0) => None,
            Some(bytes) => Some(bytes),
            None => defaults.quota_bytes,
        };

        Self {
            prefix: env::var("VIRGIL_STORAGE_PREFIX")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.prefix),
            data_path: env::var("VIRGIL_STORAGE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            quota_bytes,
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval),
            environment: env::var("VIRGIL_ENV")
                .ok()
                .and_then(|v| Environment::parse(&v))
                .unwrap_or(defaults.environment),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            data_path: PathBuf::from("virgil-storage.json"),
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
            server_port: 3000,
            sweep_interval: 0,
            environment: Environment::from_build(),
        }
    }
}
