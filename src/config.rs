//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::cache::{DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_TTL_SECS, MIN_SWEEP_INTERVAL};

/// Env file read by the binary before the process environment
pub const ENV_FILE: &str = "config.env";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Postgres host
    pub db_host: String,
    /// Postgres port
    pub db_port: u16,
    /// Postgres user
    pub db_user: String,
    /// Postgres password
    pub db_password: String,
    /// Postgres database name
    pub db_name: String,
    /// Upper bound on pooled connections
    pub db_max_connections: u32,
    /// Connections kept open while idle
    pub db_min_connections: u32,
    /// Comma-separated Kafka bootstrap servers
    pub kafka_brokers: String,
    /// Topic carrying order messages
    pub kafka_topic: String,
    /// Consumer group id
    pub kafka_group_id: String,
    /// Seconds an order stays readable in the cache after its last write
    pub cache_ttl: u64,
    /// Seconds between cache eviction sweeps
    pub sweep_interval: u64,
    /// Deadline in milliseconds for a single store call
    pub store_timeout_ms: u64,
    /// Pause in milliseconds after a failed stream read
    pub read_backoff_ms: u64,
    /// Attempts per message when the store is transiently unavailable
    pub process_max_attempts: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `HTTP_HOST` / `HTTP_PORT` - Listen address (default: 0.0.0.0:8080)
    /// - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` - Postgres connection
    /// - `DB_MAX_CONNECTIONS` / `DB_MIN_CONNECTIONS` - Pool bounds (default: 20 / 5)
    /// - `KAFKA_BROKERS`, `KAFKA_TOPIC`, `KAFKA_GROUP_ID` - Stream source
    /// - `CACHE_TTL_SECS` - Cache TTL in seconds (default: 86400)
    /// - `SWEEP_INTERVAL_SECS` - Sweep frequency in seconds (default: 3600)
    /// - `STORE_TIMEOUT_MS` - Per-call store deadline (default: 5000)
    /// - `READ_BACKOFF_MS` - Delay after a stream read error (default: 1000)
    /// - `PROCESS_MAX_ATTEMPTS` - Store attempts per message (default: 3)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            http_host: env_or("HTTP_HOST", defaults.http_host),
            http_port: parse_or("HTTP_PORT", defaults.http_port),
            db_host: env_or("DB_HOST", defaults.db_host),
            db_port: parse_or("DB_PORT", defaults.db_port),
            db_user: env_or("DB_USER", defaults.db_user),
            db_password: env_or("DB_PASSWORD", defaults.db_password),
            db_name: env_or("DB_NAME", defaults.db_name),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            db_min_connections: parse_or("DB_MIN_CONNECTIONS", defaults.db_min_connections),
            kafka_brokers: env_or("KAFKA_BROKERS", defaults.kafka_brokers),
            kafka_topic: env_or("KAFKA_TOPIC", defaults.kafka_topic),
            kafka_group_id: env_or("KAFKA_GROUP_ID", defaults.kafka_group_id),
            cache_ttl: parse_or("CACHE_TTL_SECS", defaults.cache_ttl),
            sweep_interval: parse_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval),
            store_timeout_ms: parse_or("STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            read_backoff_ms: parse_or("READ_BACKOFF_MS", defaults.read_backoff_ms),
            process_max_attempts: parse_or("PROCESS_MAX_ATTEMPTS", defaults.process_max_attempts),
        }
    }

    /// Loads `path` into the process environment, then reads the config.
    ///
    /// A missing or unreadable file is not an error. Variables already set in
    /// the environment take precedence over the file.
    pub fn from_env_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match dotenvy::from_filename(path) {
            Ok(loaded) => debug!(path = %loaded.display(), "Loaded env file"),
            Err(err) => debug!(path = %path.display(), error = %err, "Env file not loaded"),
        }
        Self::from_env()
    }

    /// Cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// Sweep interval as a Duration, never below [`MIN_SWEEP_INTERVAL`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval).max(MIN_SWEEP_INTERVAL)
    }

    /// Store call deadline as a Duration.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Stream read backoff as a Duration.
    pub fn read_backoff(&self) -> Duration {
        Duration::from_millis(self.read_backoff_ms)
    }

    /// `host:port` string for the HTTP listener.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_user: "postgres".to_string(),
            db_password: String::new(),
            db_name: "orders_db".to_string(),
            db_max_connections: 20,
            db_min_connections: 5,
            kafka_brokers: "localhost:9092".to_string(),
            kafka_topic: "orders".to_string(),
            kafka_group_id: "orders_consumer_group".to_string(),
            cache_ttl: DEFAULT_TTL_SECS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_SECS,
            store_timeout_ms: 5000,
            read_backoff_ms: 1000,
            process_max_attempts: 3,
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or_else(|_| {
        debug!(key, "Variable not set, using default");
        default
    })
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            debug!(key, value = %raw, "Variable not parseable, using default");
            default
        }),
        Err(_) => {
            debug!(key, "Variable not set, using default");
            default
        }
    }
}
