use std::env;
use std::fmt;

use crate::auth::token::DEFAULT_TOKEN_TTL_SECS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            server_port: parse_or("SERVER_PORT", lookup("SERVER_PORT"), 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            token_ttl_secs: parse_or("TOKEN_TTL_SECS", lookup("TOKEN_TTL_SECS"), DEFAULT_TOKEN_TTL_SECS)
                .and_then(|ttl| {
                    if ttl > 0 {
                        Ok(ttl)
                    } else {
                        Err(ConfigError::Invalid { key: "TOKEN_TTL_SECS", value: ttl.to_string() })
                    }
                })?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.token_ttl_secs, 3600);
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://test"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("TOKEN_TTL_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://test"));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.token_ttl_secs, 60);
    }

    #[test]
    fn test_config_errors() {
        assert_eq!(
            Config::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
        assert!(matches!(
            Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("SERVER_PORT", "eighty")])),
            Err(ConfigError::Invalid { key: "SERVER_PORT", .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("TOKEN_TTL_SECS", "0")])),
            Err(ConfigError::Invalid { key: "TOKEN_TTL_SECS", .. })
        ));
    }
}
