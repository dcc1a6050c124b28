//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use super::constants::{
    DEFAULT_CORS_ORIGIN, DEFAULT_DB_CONNECT_TIMEOUT_SECS, DEFAULT_DB_HOST,
    DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_DB_PORT, DEFAULT_HEARTBEAT_INTERVAL_SECS,
    DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SHUTDOWN_GRACE_SECS,
};

/// Configuration loading errors. All of them are fatal at startup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Credentials and addressing for the relational store.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    password: String,
    pub database: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl DatabaseCredentials {
    /// Build credentials with default host, port and pool sizing.
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_DB_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Get the password for authenticating against the store.
    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database: DatabaseCredentials,
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origin: String,
    pub idle_timeout: Duration,
    pub shutdown_grace: Duration,
    pub heartbeat_interval: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database", &self.database)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .field("idle_timeout", &self.idle_timeout)
            .field("shutdown_grace", &self.shutdown_grace)
            .field("heartbeat_interval", &self.heartbeat_interval)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] when `DB_USER`, `DB_PASSWORD` or
    /// `DB_NAME` is absent, and [`ConfigError::Invalid`] for unparsable numbers or a zero
    /// interval, timeout or pool size.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let user = value("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
        let password = value("DB_PASSWORD").ok_or(ConfigError::Missing("DB_PASSWORD"))?;
        let database = value("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;

        let database = DatabaseCredentials {
            host: value("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            port: parse_or(&value, "DB_PORT", DEFAULT_DB_PORT)?,
            user,
            password,
            database,
            max_connections: parse_positive_or(
                &value,
                "DB_MAX_CONNECTIONS",
                DEFAULT_DB_MAX_CONNECTIONS,
            )?,
            connect_timeout: Duration::from_secs(parse_positive_or(
                &value,
                "DB_CONNECT_TIMEOUT_SECS",
                DEFAULT_DB_CONNECT_TIMEOUT_SECS,
            )?),
        };

        Ok(Self {
            database,
            server_host: value("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_or(&value, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            cors_allowed_origin: value("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            idle_timeout: Duration::from_secs(parse_positive_or(
                &value,
                "IDLE_TIMEOUT_SECS",
                DEFAULT_IDLE_TIMEOUT_SECS,
            )?),
            shutdown_grace: Duration::from_secs(parse_or(
                &value,
                "SHUTDOWN_GRACE_SECS",
                DEFAULT_SHUTDOWN_GRACE_SECS,
            )?),
            heartbeat_interval: Duration::from_secs(parse_positive_or(
                &value,
                "HEARTBEAT_INTERVAL_SECS",
                DEFAULT_HEARTBEAT_INTERVAL_SECS,
            )?),
        })
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T, F>(value: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match value(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

/// Like [`parse_or`], but zero is rejected.
fn parse_positive_or<T, F>(value: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
    F: Fn(&str) -> Option<String>,
{
    let parsed = parse_or(value, name, default)?;
    if parsed == T::default() {
        return Err(ConfigError::Invalid {
            name,
            value: "0".to_string(),
        });
    }
    Ok(parsed)
}
