use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub telegram_api_url: String,

    // Feeds
    pub feeds_file: PathBuf,
    pub poll_interval: Duration,
    pub entry_window: usize,
    pub category_filter: String,
    pub http_timeout: Duration,

    // History
    pub history_path: PathBuf,
    pub history_max_entries: Option<usize>,

    // Delivery
    pub delivery_policy: DeliveryPolicy,
}

/// When a link is recorded in history relative to the send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Record before sending; a failed send is never retried.
    AtMostOnce,
    /// Record only after the sink confirms the send; a failed send is retried next pass.
    AtLeastOnce,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A missing `TOKEN` is not an error here: the relay still runs, but
    /// every Telegram call will be rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Telegram
            bot_token: env_or_default("TOKEN", ""),
            telegram_api_url: env_or_default("TELEGRAM_API_URL", "https://api.telegram.org"),

            // Feeds
            feeds_file: PathBuf::from(env_or_default("FEEDS_FILE", "feeds.toml")),
            poll_interval: Duration::from_secs(parse_env_u64("POLL_INTERVAL_SECS", 300)?),
            entry_window: parse_env_usize("ENTRY_WINDOW", 5)?,
            category_filter: env_or_default("CATEGORY_FILTER", "Hard Rock"),
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),

            // History
            history_path: PathBuf::from(env_or_default("HISTORY_PATH", "enviados.json")),
            history_max_entries: optional_env("HISTORY_MAX_ENTRIES")
                .map(|v| {
                    v.parse().map_err(|e| ConfigError::ParseInt {
                        name: "HISTORY_MAX_ENTRIES".to_string(),
                        source: e,
                    })
                })
                .transpose()?,

            // Delivery
            delivery_policy: parse_delivery_policy(&env_or_default(
                "DELIVERY_POLICY",
                "at-most-once",
            ))?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entry_window == 0 {
            return Err(ConfigError::InvalidValue {
                name: "ENTRY_WINDOW".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "POLL_INTERVAL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.category_filter.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "CATEGORY_FILTER".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.history_max_entries == Some(0) {
            return Err(ConfigError::InvalidValue {
                name: "HISTORY_MAX_ENTRIES".to_string(),
                message: "must be at least 1 when set".to_string(),
            });
        }
        if url::Url::parse(&self.telegram_api_url).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "TELEGRAM_API_URL".to_string(),
                message: format!("not a valid URL: '{}'", self.telegram_api_url),
            });
        }
        Ok(())
    }

    /// Baseline configuration for tests. The Telegram URL points at a closed port
    /// so tests must override it.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            bot_token: "test-token".to_string(),
            telegram_api_url: "http://127.0.0.1:9".to_string(),
            feeds_file: PathBuf::from("feeds.toml"),
            poll_interval: Duration::from_secs(300),
            entry_window: 5,
            category_filter: "Hard Rock".to_string(),
            http_timeout: Duration::from_secs(10),
            history_path: PathBuf::from("enviados.json"),
            history_max_entries: None,
            delivery_policy: DeliveryPolicy::AtMostOnce,
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_delivery_policy(value: &str) -> Result<DeliveryPolicy, ConfigError> {
    match value.to_lowercase().replace('_', "-").as_str() {
        "at-most-once" => Ok(DeliveryPolicy::AtMostOnce),
        "at-least-once" => Ok(DeliveryPolicy::AtLeastOnce),
        _ => Err(ConfigError::InvalidValue {
            name: "DELIVERY_POLICY".to_string(),
            message: format!("must be 'at-most-once' or 'at-least-once', got '{value}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delivery_policy() {
        assert_eq!(
            parse_delivery_policy("at-most-once").unwrap(),
            DeliveryPolicy::AtMostOnce
        );
        assert_eq!(
            parse_delivery_policy("AT_LEAST_ONCE").unwrap(),
            DeliveryPolicy::AtLeastOnce
        );
        assert!(parse_delivery_policy("exactly-once").is_err());
    }

    #[test]
    fn test_parse_u64_default() {
        assert_eq!(parse_env_u64("NONEXISTENT_RELAY_VAR", 300).unwrap(), 300);
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let config = Config {
            entry_window: 0,
            ..Config::for_testing()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_retention() {
        let config = Config {
            history_max_entries: Some(0),
            ..Config::for_testing()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_testing_config_is_valid() {
        assert!(Config::for_testing().validate().is_ok());
    }
}
