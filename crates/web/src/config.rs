use anyhow::{Context, Result};
use storage::services::scoreboard::DEFAULT_POLL_INTERVAL_MS;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
    pub poll_interval_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            poll_interval_ms: match std::env::var("SCOREBOARD_POLL_MS") {
                Ok(value) => value
                    .parse()
                    .context("SCOREBOARD_POLL_MS must be a number of milliseconds")?,
                Err(_) => DEFAULT_POLL_INTERVAL_MS,
            },
        })
    }

    /// Connection string with credentials stripped, for logs.
    pub fn database_host(&self) -> &str {
        self.database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    }
}
