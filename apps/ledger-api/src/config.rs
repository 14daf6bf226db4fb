//! Ledger API configuration module.
//!
//! Configuration is read from `SEDEKAT_`-prefixed environment variables
//! layered over defaults:
//!
//! | Variable                         | Default        |
//! |----------------------------------|----------------|
//! | `SEDEKAT_HTTP_PORT`              | `8080`         |
//! | `SEDEKAT_DATABASE_PATH`          | `./sedekat.db` |
//! | `SEDEKAT_MAX_CONNECTIONS`        | `5`            |
//! | `SEDEKAT_BALANCE_CACHE_TTL_SECS` | `15` (0 = off) |

use std::collections::HashMap;
use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;

/// Ledger API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub max_connections: u32,

    /// Dashboard balance cache lifetime; 0 disables the cache
    pub balance_cache_ttl_secs: u64,
}

impl ApiConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(Environment::with_prefix("SEDEKAT").try_parsing(true))
    }

    /// Load configuration from an explicit variable map instead of the process
    /// environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::build(
            Environment::with_prefix("SEDEKAT")
                .try_parsing(true)
                .source(Some(vars)),
        )
    }

    fn build(env: Environment) -> Result<Self, ConfigError> {
        let config: ApiConfig = Config::builder()
            .set_default("http_port", 8080)?
            .set_default("database_path", "./sedekat.db")?
            .set_default("max_connections", 5)?
            .set_default("balance_cache_ttl_secs", 15)?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("SEDEKAT_MAX_CONNECTIONS".to_string()));
        }
        if config.database_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue("SEDEKAT_DATABASE_PATH".to_string()));
        }

        Ok(config)
    }

    pub fn balance_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.balance_cache_ttl_secs)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database_path, "./sedekat.db");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.balance_cache_ttl(), Duration::from_secs(15));
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = ApiConfig::from_vars(vars(&[
            ("SEDEKAT_HTTP_PORT", "9000"),
            ("SEDEKAT_DATABASE_PATH", "/var/lib/sedekat/ledger.db"),
            ("SEDEKAT_BALANCE_CACHE_TTL_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.database_path, "/var/lib/sedekat/ledger.db");
        assert_eq!(config.balance_cache_ttl_secs, 0);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(ApiConfig::from_vars(vars(&[("SEDEKAT_HTTP_PORT", "not-a-port")])).is_err());
        assert!(ApiConfig::from_vars(vars(&[("SEDEKAT_HTTP_PORT", "70000")])).is_err());
    }

    #[test]
    fn test_zero_connections_rejected() {
        let err = ApiConfig::from_vars(vars(&[("SEDEKAT_MAX_CONNECTIONS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name) if name == "SEDEKAT_MAX_CONNECTIONS"));
    }
}
