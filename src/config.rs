use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_dir: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    /// Timezone marks are filed in ("schedule.timezone")
    pub attendance_timezone: Tz,
    pub status_cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", 1000)?,

            attendance_timezone: env::var("ATTENDANCE_TIMEZONE")
                .unwrap_or_else(|_| "America/Bogota".to_string())
                .parse::<Tz>()
                .map_err(|e| anyhow!("ATTENDANCE_TIMEZONE is not an IANA timezone: {e}"))?,
            status_cache_ttl: Duration::from_secs(parsed("STATUS_CACHE_TTL_SECS", 3600)?),
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value {raw:?}")),
        Err(_) => Ok(default),
    }
}
