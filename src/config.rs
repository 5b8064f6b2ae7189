use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub tokenscan: TokenscanConfig,
}

/// Settings for the tokenscan client and reconciliation loop.
#[derive(Debug, Deserialize, Clone)]
pub struct TokenscanConfig {
    pub endpoint: String,
    pub auth_identifier: String,
    pub auth_secret: String,
    /// Tick frequency of the payment reconciliation loop.
    pub interval: Duration,
    /// Blocks past a payment before it counts as final.
    pub confirmations: i64,
    /// Escape hatch: skip every tick without fetching.
    pub disable_loop: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/tokenpay".to_string()),
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            tokenscan: TokenscanConfig::from_env()?,
        })
    }
}

impl TokenscanConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let interval_secs = parse_var("TOKENSCAN_INTERVAL_SECS", 60u64)?;
        Ok(Self {
            endpoint: std::env::var("TOKENSCAN_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:12000".to_string()),
            auth_identifier: std::env::var("TOKENSCAN_AUTH_IDENTIFIER").unwrap_or_default(),
            auth_secret: std::env::var("TOKENSCAN_AUTH_SECRET").unwrap_or_default(),
            interval: Duration::from_secs(interval_secs),
            confirmations: parse_var("TOKENSCAN_CONFIRMATIONS", 12i64)?,
            disable_loop: parse_var("TOKENSCAN_DISABLE_LOOP", false)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, config::ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|err| config::ConfigError::Message(format!("{}: {}", name, err))),
        Err(_) => Ok(default),
    }
}
