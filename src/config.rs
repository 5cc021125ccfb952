use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is not in the correct format: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub host: IpAddr,
    pub port: u16,
    pub static_index: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_host: "localhost".to_string(),
            db_port: 3306,
            db_name: "minigolfe_portugal".to_string(),
            db_user: "root".to_string(),
            db_password: String::new(),
            db_max_connections: 5,
            db_acquire_timeout: Duration::from_secs(5),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            static_index: PathBuf::from("exp.html"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            db_host: lookup("DB_HOST").unwrap_or(defaults.db_host),
            db_port: parse_or(&lookup, "DB_PORT", defaults.db_port)?,
            db_name: lookup("DB_NAME").unwrap_or(defaults.db_name),
            db_user: lookup("DB_USER").unwrap_or(defaults.db_user),
            db_password: lookup("DB_PASSWORD").unwrap_or(defaults.db_password),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_acquire_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.db_acquire_timeout.as_secs(),
            )?),
            host: parse_or(&lookup, "HOST", defaults.host)?,
            port: parse_or(&lookup, "PORT", defaults.port)?,
            static_index: lookup("STATIC_INDEX").map(PathBuf::from).unwrap_or(defaults.static_index),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .database(&self.db_name)
            .username(&self.db_user)
            .password(&self.db_password)
            .charset("utf8mb4")
    }

    /// Creates the pool without connecting; connection failures surface per request.
    pub fn lazy_pool(&self) -> MySqlPool {
        MySqlPoolOptions::new()
            .max_connections(self.db_max_connections)
            .acquire_timeout(self.db_acquire_timeout)
            .connect_lazy_with(self.connect_options())
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.db_host, "localhost");
        assert_eq!(config.db_name, "minigolfe_portugal");
        assert_eq!(config.db_user, "root");
        assert_eq!(config.db_port, 3306);
        assert_eq!(config.bind_addr().port(), 5000);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DB_HOST", "db.internal"),
            ("DB_NAME", "golf"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "1"),
        ]))
        .unwrap();

        assert_eq!(config.db_host, "db.internal");
        assert_eq!(config.db_name, "golf");
        assert_eq!(config.bind_addr(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(1));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
