//! Client configuration.
//!
//! A small serde struct the host loads from JSON (or builds in code) and
//! hands to the composition root. Durations are stored as integer fields to
//! keep the on-disk format trivial for every host platform.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_ticker_interval_ms() -> u64 {
    1_000
}

fn default_event_buffer() -> usize {
    crate::events::DEFAULT_EVENT_BUFFER_SIZE
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the catalog/auth REST API.
    pub api_base_url: String,
    /// Per-request HTTP timeout, seconds.
    pub http_timeout_secs: u64,
    /// Position ticker poll interval, milliseconds.
    pub ticker_interval_ms: u64,
    /// Event bus channel capacity.
    pub event_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            http_timeout_secs: default_http_timeout_secs(),
            ticker_interval_ms: default_ticker_interval_ms(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl ClientConfig {
    /// Parse a configuration from a JSON string. Missing fields fall back to
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Check the configuration for values the client cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }
        if self.ticker_interval_ms == 0 {
            return Err(Error::Config(
                "ticker_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.event_buffer == 0 {
            return Err(Error::Config(
                "event_buffer must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// HTTP timeout as a [`Duration`].
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Ticker interval as a [`Duration`].
    pub fn ticker_interval(&self) -> Duration {
        Duration::from_millis(self.ticker_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        config.validate().unwrap();
        assert_eq!(config.ticker_interval(), Duration::from_secs(1));
    }

    #[test]
    fn json_round_trip() {
        let config = ClientConfig {
            api_base_url: "https://music.example.com".to_string(),
            http_timeout_secs: 5,
            ticker_interval_ms: 250,
            event_buffer: 32,
        };

        let json = config.to_json().unwrap();
        let parsed = ClientConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = ClientConfig::from_json(r#"{"api_base_url": "https://api.test"}"#).unwrap();
        assert_eq!(config.api_base_url, "https://api.test");
        assert_eq!(config.ticker_interval_ms, 1_000);
    }

    #[test]
    fn zero_ticker_interval_is_rejected() {
        let result = ClientConfig::from_json(r#"{"ticker_interval_ms": 0}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
