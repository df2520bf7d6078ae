//! Configuration management for the ledger.
//!
//! Settings come from an optional `ledger.toml` file and can be overridden
//! through environment variables (`DATABASE_URL`, `LEDGER_CONFIG` for the
//! file location). Only deployment concerns live here; business settings
//! such as the interest rate are stored in the `parameter` table so they
//! travel with the data store.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Default on-disk location of the SQLite store. `mode=rwc` creates the
/// file on first open.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/caisse_ledger.sqlite?mode=rwc";

const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);
const DEFAULT_BACKOFF_CAP: Duration = Duration::from_secs(10);

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection URL
    pub database_url: String,
    /// How many times the gateway tries to open the store before giving up
    pub connect_attempts: u32,
    /// First retry delay; doubles on each subsequent attempt
    pub backoff_base: Duration,
    /// Ceiling on the retry delay
    pub backoff_cap: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
            backoff_cap: DEFAULT_BACKOFF_CAP,
        }
    }
}

/// Shape of `ledger.toml`. Every field is optional; missing values fall
/// back to the defaults above.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database_url: Option<String>,
    connect_attempts: Option<u32>,
    backoff_base_ms: Option<u64>,
    backoff_cap_ms: Option<u64>,
}

/// Loads the application configuration.
///
/// Precedence, highest first: environment variables, `ledger.toml`,
/// built-in defaults. A missing config file is not an error; a present but
/// unparsable one is.
pub fn load_app_configuration() -> Result<AppConfig> {
    let config_path =
        std::env::var("LEDGER_CONFIG").unwrap_or_else(|_| "ledger.toml".to_string());

    let file_config = if Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)?;
        let parsed: FileConfig = toml::from_str(&raw).map_err(|e| Error::Config {
            message: format!("failed to parse {config_path}: {e}"),
        })?;
        info!("Loaded configuration from {}", config_path);
        parsed
    } else {
        debug!("No config file at {}, using defaults", config_path);
        FileConfig::default()
    };

    let defaults = AppConfig::default();
    let database_url = std::env::var("DATABASE_URL")
        .ok()
        .or(file_config.database_url)
        .unwrap_or(defaults.database_url);

    let config = AppConfig {
        database_url,
        connect_attempts: file_config
            .connect_attempts
            .unwrap_or(defaults.connect_attempts)
            .max(1),
        backoff_base: file_config
            .backoff_base_ms
            .map_or(defaults.backoff_base, Duration::from_millis),
        backoff_cap: file_config
            .backoff_cap_ms
            .map_or(defaults.backoff_cap, Duration::from_millis),
    };

    debug!(
        "Resolved configuration: url={}, attempts={}",
        config.database_url, config.connect_attempts
    );
    Ok(config)
}
