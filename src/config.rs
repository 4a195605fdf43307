// src/config.rs

use dotenvy::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};

/// Which `CommentStore` implementation the process runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreKind::Postgres),
            "memory" | "mem" => Ok(StoreKind::Memory),
            other => Err(ConfigError(format!("unknown COMMENT_STORE '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreKind,
    /// Required when `store` is `Postgres`.
    pub database_url: Option<String>,
    pub http_port: u16,
    pub rust_log: String,
    pub db_max_connections: u32,
    /// Deadline applied to every single storage attempt.
    pub db_timeout: Duration,
    pub db_retry_attempts: u32,
    pub static_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreKind::Postgres,
            database_url: None,
            http_port: 3000,
            rust_log: "info".to_string(),
            db_max_connections: 5,
            db_timeout: Duration::from_secs(3),
            db_retry_attempts: 3,
            static_dir: "static".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let defaults = Config::default();

        let store = match env::var("COMMENT_STORE") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.store,
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err(ConfigError("DATABASE_URL must be set".to_string()));
        }

        let rust_log = env::var("RUST_LOG").unwrap_or(defaults.rust_log);
        let static_dir = env::var("STATIC_DIR").unwrap_or(defaults.static_dir);

        Ok(Self {
            store,
            database_url,
            http_port: parse_var("HTTP_PORT", defaults.http_port)?,
            rust_log,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_timeout: Duration::from_secs(parse_var("DB_TIMEOUT_SECS", 3u64)?),
            db_retry_attempts: parse_var("DB_RETRY_ATTEMPTS", defaults.db_retry_attempts)?.max(1),
            static_dir,
        })
    }
}

/// Reads an optional numeric variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError(format!("{} has an invalid value '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_kind_parses_aliases() {
        assert_eq!("postgres".parse::<StoreKind>().unwrap(), StoreKind::Postgres);
        assert_eq!(" Memory ".parse::<StoreKind>().unwrap(), StoreKind::Memory);
        assert!("redis".parse::<StoreKind>().is_err());
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.store, StoreKind::Postgres);
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.db_retry_attempts, 3);
        assert_eq!(config.db_timeout, Duration::from_secs(3));
    }
}
