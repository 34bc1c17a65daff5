//! Application configuration loaded from environment variables.
//!
//! Fail-fast: required variables must be present and valid, or startup
//! aborts with the variable named.

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingVar { var: &'static str },

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: &'static str, message: String },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,

    /// PostgreSQL connection string.
    pub database_url: String,
    /// Maximum connections in the pool.
    pub db_max_connections: u32,

    /// Payment provider API base URL.
    pub payment_api_base_url: String,
    /// Bearer token for the provider API.
    pub payment_api_token: String,

    /// Current webhook shared secret.
    pub webhook_secret: String,
    /// Previous webhook secret, accepted during rotation.
    pub webhook_secret_previous: Option<String>,

    /// Default reconciliation window in days.
    pub reconcile_window_days: i64,
    /// Seconds between scheduled reconciliation scans. 0 disables the
    /// periodic worker (on-demand runs stay available).
    pub reconcile_interval_secs: u64,

    /// Log filter directive.
    pub rust_log: String,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", 8080)?,
            database_url: require("DATABASE_URL")?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            payment_api_base_url: require("PAYMENT_API_BASE_URL")?,
            payment_api_token: require("PAYMENT_API_TOKEN")?,
            webhook_secret: require("PAYMENT_WEBHOOK_SECRET")?,
            webhook_secret_previous: optional("PAYMENT_WEBHOOK_SECRET_PREVIOUS"),
            reconcile_window_days: positive_or("RECONCILE_WINDOW_DAYS", 7)?,
            reconcile_interval_secs: parse_or("RECONCILE_INTERVAL_SECS", 3600)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar { var }),
    }
}

fn optional(var: &'static str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.is_empty())
}

fn parse_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match optional(var) {
        Some(value) => parse_value(var, &value),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        message: e.to_string(),
    })
}

fn positive_or(var: &'static str, default: i64) -> Result<i64, ConfigError> {
    let value = parse_or(var, default)?;
    if value <= 0 {
        return Err(ConfigError::InvalidValue {
            var,
            message: "must be positive".to_string(),
        });
    }
    Ok(value)
}
