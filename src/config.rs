use std::env;

use anyhow::Context;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Runtime configuration, read once at startup. `DATABASE_URL` is
/// required; `BIND_ADDR` and `SESSION_TTL_HOURS` default to values
/// suitable for local development.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        // A misconfigured TTL fails startup instead of silently issuing
        // sessions with the default lifetime.
        let session_ttl_hours = match env::var("SESSION_TTL_HOURS") {
            Ok(raw) => parse_session_ttl(&raw)?,
            Err(_) => DEFAULT_SESSION_TTL_HOURS,
        };

        Ok(Self {
            database_url,
            bind_addr,
            session_ttl_hours,
        })
    }
}

fn parse_session_ttl(raw: &str) -> anyhow::Result<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|hours| *hours > 0)
        .with_context(|| format!("SESSION_TTL_HOURS must be a positive integer, got `{raw}`"))
}
