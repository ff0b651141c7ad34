use anyhow::{Context, Result};
use chrono::Duration;
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub user_session_ttl: Duration,
}

impl Config {
    /// Load configuration from the environment, reading a `.env` file first
    /// if one is present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://todo.db".to_string());
        let ttl_hours: i64 = env::var("USER_SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "744".to_string())
            .parse()
            .context("USER_SESSION_TTL_HOURS must be a valid number of hours")?;

        Ok(Self {
            database_url,
            user_session_ttl: Duration::hours(ttl_hours),
        })
    }
}
