//! Tests for loading configuration from the environment.

use std::time::Duration;

use forum_feed_relay::config::{Config, DeliveryPolicy};
use serial_test::serial;

const VARS: &[&str] = &[
    "TOKEN",
    "TELEGRAM_API_URL",
    "FEEDS_FILE",
    "POLL_INTERVAL_SECS",
    "ENTRY_WINDOW",
    "CATEGORY_FILTER",
    "HTTP_TIMEOUT_SECS",
    "HISTORY_PATH",
    "HISTORY_MAX_ENTRIES",
    "DELIVERY_POLICY",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();
    config.validate().unwrap();

    assert!(config.bot_token.is_empty());
    assert_eq!(config.telegram_api_url, "https://api.telegram.org");
    assert_eq!(config.poll_interval, Duration::from_secs(300));
    assert_eq!(config.entry_window, 5);
    assert_eq!(config.category_filter, "Hard Rock");
    assert_eq!(config.history_path.to_str(), Some("enviados.json"));
    assert_eq!(config.history_max_entries, None);
    assert_eq!(config.delivery_policy, DeliveryPolicy::AtMostOnce);
}

#[test]
#[serial]
fn test_overrides() {
    clear_env();
    std::env::set_var("TOKEN", "123:abc");
    std::env::set_var("POLL_INTERVAL_SECS", "60");
    std::env::set_var("ENTRY_WINDOW", "10");
    std::env::set_var("CATEGORY_FILTER", "Blues Rock");
    std::env::set_var("HISTORY_PATH", "/var/lib/relay/history.json");
    std::env::set_var("HISTORY_MAX_ENTRIES", "5000");
    std::env::set_var("DELIVERY_POLICY", "at-least-once");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.bot_token, "123:abc");
    assert_eq!(config.poll_interval, Duration::from_secs(60));
    assert_eq!(config.entry_window, 10);
    assert_eq!(config.category_filter, "Blues Rock");
    assert_eq!(
        config.history_path.to_str(),
        Some("/var/lib/relay/history.json")
    );
    assert_eq!(config.history_max_entries, Some(5000));
    assert_eq!(config.delivery_policy, DeliveryPolicy::AtLeastOnce);
}

#[test]
#[serial]
fn test_invalid_number_is_rejected() {
    clear_env();
    std::env::set_var("POLL_INTERVAL_SECS", "five minutes");

    let result = Config::from_env();
    clear_env();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("POLL_INTERVAL_SECS"));
}

#[test]
#[serial]
fn test_invalid_policy_is_rejected() {
    clear_env();
    std::env::set_var("DELIVERY_POLICY", "exactly-once");

    let result = Config::from_env();
    clear_env();

    assert!(result.is_err());
}
