//! Configuration management for the liquidation sentinel.
//!
//! Loads settings from environment variables and config files. The bot
//! token is the one secret: it resolves from `TELEGRAM_BOT_TOKEN` first,
//! falls back to the config file, and is never logged or serialized.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Telegram Bot API settings
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Venue (position source) settings
    #[serde(default)]
    pub venue: VenueConfig,
    /// Monitoring loop parameters
    #[serde(default)]
    pub monitor: MonitorConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token; prefer the TELEGRAM_BOT_TOKEN environment variable
    #[serde(default, skip_serializing)]
    pub bot_token: String,
    /// Bot API host
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    /// getUpdates long-poll window in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Hyperliquid info endpoint host
    #[serde(default = "default_venue_api_url")]
    pub api_url: String,
    /// Builder-deployed dex namespace to query
    #[serde(default = "default_dex")]
    pub dex: String,
    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between poll cycles
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Alert threshold in quote currency when /start omits one
    #[serde(default = "default_threshold")]
    pub default_threshold: Decimal,
    /// Consecutive fetch failures before the subscriber is notified
    #[serde(default = "default_failure_alert_after")]
    pub failure_alert_after: u32,
    /// SQLite database path for the subscriber registry
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Chat id allowed to use /list; unset disables the command
    #[serde(default)]
    pub admin_chat_id: Option<i64>,
}

// Default value functions
fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_venue_api_url() -> String {
    "https://api.hyperliquid-testnet.xyz".to_string()
}

fn default_dex() -> String {
    "vntls".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    30
}

fn default_threshold() -> Decimal {
    Decimal::new(5, 0) // $5 from liquidation
}

fn default_failure_alert_after() -> u32 {
    3
}

fn default_db_path() -> String {
    "data/subscribers.db".to_string()
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default().separator("__").prefix("SENTINEL"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.monitor.poll_interval_secs >= 1,
            "poll_interval_secs must be at least 1"
        );

        anyhow::ensure!(
            self.monitor.default_threshold > Decimal::ZERO,
            "default_threshold must be positive"
        );

        anyhow::ensure!(
            self.monitor.failure_alert_after >= 1,
            "failure_alert_after must be at least 1"
        );

        anyhow::ensure!(!self.venue.api_url.is_empty(), "venue api_url must be set");
        anyhow::ensure!(!self.venue.dex.is_empty(), "venue dex must be set");
        anyhow::ensure!(
            self.venue.request_timeout_secs >= 1,
            "request_timeout_secs must be at least 1"
        );

        anyhow::ensure!(
            self.telegram.poll_timeout_secs >= 1,
            "poll_timeout_secs must be at least 1"
        );

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            venue: VenueConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: default_telegram_api_url(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            api_url: default_venue_api_url(),
            dex: default_dex(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            default_threshold: default_threshold(),
            failure_alert_after: default_failure_alert_after(),
            db_path: default_db_path(),
            admin_chat_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.monitor.poll_interval_secs, 30);
        assert_eq!(config.monitor.default_threshold, dec!(5));
        assert_eq!(config.monitor.failure_alert_after, 3);
        assert_eq!(config.venue.dex, "vntls");
        assert_eq!(config.venue.api_url, "https://api.hyperliquid-testnet.xyz");
        assert!(config.monitor.admin_chat_id.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.monitor.poll_interval_secs = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_output_redacts_token() {
        let mut config = Config::default();
        config.telegram.bot_token = "SECRET_TOKEN".to_string();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("SECRET_TOKEN"));
        assert!(debug.contains("<redacted>"));
    }
}
