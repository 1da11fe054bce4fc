use std::env;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8080";
const DEFAULT_PAGE_SIZE: &str = "6";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub bind_address: String,
    pub port: u16,
    pub page_size: i64,
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up `.env`.
    pub fn load() -> Result<Self, ConfigError> {
        let page_size: i64 = try_load("PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size < 1 {
            return Err(ConfigError::Invalid {
                key: "PAGE_SIZE",
                value: page_size.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            bind_address: try_load("BIND_ADDRESS", DEFAULT_BIND_ADDRESS)?,
            port: try_load("PORT", DEFAULT_PORT)?,
            page_size,
        })
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        log::info!("{} not set, using default: {}", key, default);
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let port: u16 = try_load("FOODGRAM_TEST_UNSET_PORT", DEFAULT_PORT).unwrap();
        let page_size: i64 = try_load("FOODGRAM_TEST_UNSET_PAGE", DEFAULT_PAGE_SIZE).unwrap();

        assert_eq!(port, 8080);
        assert_eq!(page_size, 6);
    }

    #[test]
    fn invalid_value_is_reported() {
        let err = try_load::<u16>("FOODGRAM_TEST_UNSET_BAD", "not-a-port").unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { key: "FOODGRAM_TEST_UNSET_BAD", .. }));
    }
}
