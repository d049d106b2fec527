// src/config.rs
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use std::{env, fmt::Display, net::IpAddr, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {key} value: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub jwt_secret: String,
    pub max_connections: u32,
    /// How often an open status stream re-reads its order.
    pub status_poll_interval: Duration,
    /// Offset of the stalls' local time from UTC; tokens reset at local midnight.
    pub stall_offset: FixedOffset,
    pub demo_auto_advance: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let offset_minutes: i32 = try_load("STALL_UTC_OFFSET_MINUTES", "0")?;
        let stall_offset =
            FixedOffset::east_opt(offset_minutes * 60).ok_or(ConfigError::Invalid {
                key: "STALL_UTC_OFFSET_MINUTES",
                message: format!("{offset_minutes} minutes is out of range"),
            })?;
        let poll_ms: u64 = try_load("STATUS_POLL_INTERVAL_MS", "2000")?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: try_load("HOST", "127.0.0.1")?,
            port: try_load("PORT", "3000")?,
            jwt_secret: required("JWT_SECRET")?,
            max_connections: try_load("DATABASE_MAX_CONNECTIONS", "10")?,
            status_poll_interval: Duration::from_millis(poll_ms.max(1)),
            stall_offset,
            demo_auto_advance: try_load("DEMO_AUTO_ADVANCE", "false")?,
        })
    }

    /// The stall-local calendar day right now.
    pub fn local_today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.stall_offset).date_naive()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            jwt_secret: String::new(),
            max_connections: 10,
            status_poll_interval: Duration::from_secs(2),
            stall_offset: Utc.fix(),
            demo_auto_advance: false,
        }
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                message: e.to_string(),
            }
        })
}
