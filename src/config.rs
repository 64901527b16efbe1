use sqlx::postgres::PgConnectOptions;
use std::str::FromStr;
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Server configuration, read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub database: PgConnectOptions,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database: PgConnectOptions = match lookup("DATABASE_URL") {
            // The URL may carry a password, so only the parse error is reported
            Some(url) => url.parse().map_err(|e: sqlx::Error| ConfigError::Invalid {
                key: "DATABASE_URL".to_string(),
                value: e.to_string(),
            })?,
            None => connect_options_from_parts(&lookup)?,
        };

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST".to_string(),
                value: bcrypt_cost.to_string(),
            });
        }

        Ok(Self {
            database,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            acquire_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                30,
            )?),
            bcrypt_cost,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Build connect options from the POSTGRES_* variables.
///
/// Credentials are passed as fields, never spliced into a URL.
fn connect_options_from_parts<F>(lookup: &F) -> Result<PgConnectOptions, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let require = |key: &str| lookup(key).ok_or_else(|| ConfigError::Missing(key.to_string()));

    // DATABASE_URL is the primary setting, so report it when nothing is set
    if lookup("POSTGRES_SERVER").is_none() && lookup("POSTGRES_DB").is_none() {
        return Err(ConfigError::Missing("DATABASE_URL".to_string()));
    }

    let user = require("POSTGRES_USER")?;
    let password = require("POSTGRES_PASSWORD")?;
    let server = require("POSTGRES_SERVER")?;
    let port: u16 = parse_required(lookup, "POSTGRES_PORT")?;
    let db = require("POSTGRES_DB")?;

    Ok(PgConnectOptions::new()
        .username(&user)
        .password(&password)
        .host(&server)
        .port(port)
        .database(&db))
}

fn parse_required<F, T>(lookup: &F, key: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let value = lookup(key).ok_or_else(|| ConfigError::Missing(key.to_string()))?;
    parse_value(key, value)
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => parse_value(key, value),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value,
    })
}
