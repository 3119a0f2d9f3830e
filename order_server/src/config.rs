//! Server configuration.
//!
//! Everything is read from `OIG_*` environment variables, with sane defaults and a logged
//! warning for anything malformed. The only value the server refuses to default is the database
//! url, since silently writing orders to an unexpected store would be worse than refusing to
//! start.

use std::{env, time::Duration as StdDuration};

use chrono::Duration;
use log::*;
use oig_common::parse_boolean_flag;
use order_engine::DedupConfig;

const DEFAULT_OIG_HOST: &str = "127.0.0.1";
const DEFAULT_OIG_PORT: u16 = 8060;
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 25;
const DEFAULT_QUEUE_CONSUMERS: usize = 10;
const DEFAULT_QUEUE_PREFETCH: usize = 50;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_db_connections: u32,
    /// Skip running database migrations at startup. Only useful when migrations are applied
    /// out-of-band, e.g. by an operator during a rolling upgrade.
    pub skip_migrations: bool,
    /// Duplicate-screening behaviour, shared by every intake channel.
    pub dedup: DedupConfig,
    /// Intake queue consumer pool settings.
    pub queue: QueueConfig,
    /// Buffer size for the outbound completed-order event channel.
    pub event_buffer_size: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct QueueConfig {
    /// How many queued submissions may be processed concurrently.
    pub consumers: usize,
    /// How many submissions the intake queue buffers before producers block.
    pub prefetch: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { consumers: DEFAULT_QUEUE_CONSUMERS, prefetch: DEFAULT_QUEUE_PREFETCH }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OIG_HOST.to_string(),
            port: DEFAULT_OIG_PORT,
            database_url: String::default(),
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
            skip_migrations: false,
            dedup: DedupConfig::default(),
            queue: QueueConfig::default(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("OIG_HOST").ok().unwrap_or_else(|| DEFAULT_OIG_HOST.into());
        let port = env::var("OIG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for OIG_PORT. {e} Using the default, {DEFAULT_OIG_PORT}, instead."
                    );
                    DEFAULT_OIG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_OIG_PORT);
        let database_url = env::var("OIG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ OIG_DATABASE_URL is not set. Please set it to the URL for the order store.");
            String::default()
        });
        let max_db_connections = parse_env("OIG_MAX_DB_CONNECTIONS", DEFAULT_MAX_DB_CONNECTIONS);
        let skip_migrations = parse_boolean_flag(env::var("OIG_SKIP_MIGRATIONS").ok(), false);
        let dedup = configure_dedup();
        let queue = QueueConfig {
            consumers: parse_env("OIG_QUEUE_CONSUMERS", DEFAULT_QUEUE_CONSUMERS).max(1),
            prefetch: parse_env("OIG_QUEUE_PREFETCH", DEFAULT_QUEUE_PREFETCH).max(1),
        };
        let event_buffer_size = parse_env("OIG_EVENT_BUFFER_SIZE", DEFAULT_EVENT_BUFFER_SIZE).max(1);
        Self { host, port, database_url, max_db_connections, skip_migrations, dedup, queue, event_buffer_size }
    }
}

fn configure_dedup() -> DedupConfig {
    let defaults = DedupConfig::default();
    let retention = env::var("OIG_DEDUP_RETENTION_HOURS")
        .map_err(|_| {
            info!(
                "🪛️ OIG_DEDUP_RETENTION_HOURS is not set. Using the default value of {} hrs.",
                defaults.retention.num_hours()
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::hours)
                .map_err(|e| warn!("🪛️ Invalid configuration value for OIG_DEDUP_RETENTION_HOURS. {e}"))
        })
        .ok()
        .unwrap_or(defaults.retention);
    let cache_timeout = env::var("OIG_CACHE_TIMEOUT_MS")
        .map_err(|_| {
            info!(
                "🪛️ OIG_CACHE_TIMEOUT_MS is not set. Using the default value of {} ms.",
                defaults.cache_timeout.as_millis()
            )
        })
        .and_then(|s| {
            s.parse::<u64>()
                .map(StdDuration::from_millis)
                .map_err(|e| warn!("🪛️ Invalid configuration value for OIG_CACHE_TIMEOUT_MS. {e}"))
        })
        .ok()
        .unwrap_or(defaults.cache_timeout);
    DedupConfig { retention, cache_timeout }
}

fn parse_env<T: std::str::FromStr + std::fmt::Display + Copy>(name: &str, default: T) -> T
where T::Err: std::fmt::Display {
    match env::var(name) {
        Ok(s) => s.parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}
