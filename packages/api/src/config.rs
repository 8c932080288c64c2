//! Server configuration from environment variables.
//!
//! `.env` is loaded through `dotenvy` before the environment is read. Every
//! variable has a default except `DATABASE_URL`, whose absence selects the
//! in-memory store.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::signup::SignupMode;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_CLIENT_ORIGIN: &str = "http://localhost:8080";

/// Upper bound on `OPENMED_SESSION_DAYS`, ten years.
pub const MAX_SESSION_DAYS: u64 = 3650;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// `None` runs the server on the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub geocoder_url: String,
    pub geocoder_agent: String,
    pub client_origin: String,
    pub signup_mode: SignupMode,
    pub secure_cookies: bool,
    /// Between 1 and [`MAX_SESSION_DAYS`].
    pub session_days: u64,
    /// Account granted the admin role at startup, if it exists.
    pub admin_username: Option<String>,
}

impl ServerConfig {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let atomic: bool = parse_or(&lookup, "OPENMED_SIGNUP_ATOMIC", false)?;

        let session_days: u64 = parse_or(&lookup, "OPENMED_SESSION_DAYS", 7)?;
        if !(1..=MAX_SESSION_DAYS).contains(&session_days) {
            return Err(ConfigError::Invalid {
                key: "OPENMED_SESSION_DAYS",
                value: session_days.to_string(),
                reason: format!("must be between 1 and {}", MAX_SESSION_DAYS),
            });
        }

        Ok(Self {
            addr: parse_or(&lookup, "OPENMED_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            db_max_connections: parse_or(&lookup, "OPENMED_DB_MAX_CONNECTIONS", 5)?,
            geocoder_url: lookup("OPENMED_GEOCODER_URL")
                .unwrap_or_else(|| DEFAULT_GEOCODER_URL.to_string()),
            geocoder_agent: lookup("OPENMED_GEOCODER_AGENT")
                .unwrap_or_else(|| format!("openmed/{}", env!("CARGO_PKG_VERSION"))),
            client_origin: lookup("OPENMED_CLIENT_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CLIENT_ORIGIN.to_string()),
            signup_mode: if atomic {
                SignupMode::Atomic
            } else {
                SignupMode::Compatible
            },
            secure_cookies: parse_or(&lookup, "OPENMED_SECURE_COOKIES", false)?,
            session_days,
            admin_username: lookup("OPENMED_ADMIN_USERNAME")
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        })
    }

    /// Session inactivity timeout.
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_days * 24 * 60 * 60)
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: value.clone(),
            reason: e.to_string(),
        }),
    }
}
