use std::{env, fmt::Display, str::FromStr};

use anyhow::Context;
use tracing::{info, warn};

pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub pool_size: u32,
    /// Lifetime of a login token.
    pub session_ttl_secs: i64,
    /// Length of one consultation.
    pub session_minutes: i64,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not found")?;

        Ok(Self {
            database_url,
            bind_address: try_load("BIND_ADDRESS", "127.0.0.1:8080")?,
            pool_size: try_load("DB_POOL_SIZE", "10")?,
            session_ttl_secs: try_load("SESSION_TTL_SECS", "3600")?,
            session_minutes: try_load("SESSION_MINUTES", "60")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            bind_address: "127.0.0.1:8080".to_string(),
            pool_size: 10,
            session_ttl_secs: 3600,
            session_minutes: 60,
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{} not set, using default: {}", key, default);
        default.to_string()
    });

    value.parse().map_err(|e| {
        warn!("Invalid {} value: {}", key, e);
        anyhow::anyhow!("Environment misconfigured: {}", key)
    })
}
