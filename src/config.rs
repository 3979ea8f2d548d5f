//! Configuration management for docdesk using the prefer crate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default API endpoint when nothing is configured.
pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:3000";

/// Default cap on status checks before a poll chain is abandoned.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 120;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the document service.
    pub api_endpoint: String,
    /// User agent for HTTP requests.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Delay between a finished upload and the first status check, in milliseconds.
    pub initial_poll_delay_ms: u64,
    /// Delay between status checks in milliseconds.
    pub poll_interval_ms: u64,
    /// Status checks before giving up (None = poll until completed or cancelled).
    pub max_poll_attempts: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            user_agent: None,
            request_timeout: 30,
            initial_poll_delay_ms: 3000,
            poll_interval_ms: 5000,
            max_poll_attempts: Some(DEFAULT_MAX_POLL_ATTEMPTS),
        }
    }
}

impl Settings {
    /// Create settings pointing at a custom endpoint.
    pub fn with_endpoint(api_endpoint: &str) -> Self {
        Self {
            api_endpoint: api_endpoint.to_string(),
            ..Default::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn initial_poll_delay(&self) -> Duration {
        Duration::from_millis(self.initial_poll_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the document service.
    #[serde(default)]
    pub api_endpoint: Option<String>,
    /// User agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    /// Delay before the first status check in milliseconds.
    #[serde(default)]
    pub initial_poll_delay_ms: Option<u64>,
    /// Delay between status checks in milliseconds.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    /// Maximum status checks per document. 0 disables the limit.
    #[serde(default)]
    pub max_poll_attempts: Option<u32>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers docdesk config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("docdesk").await {
            Ok(pref_config) => {
                let api_endpoint: Option<String> = pref_config.get("api_endpoint").ok();
                let user_agent: Option<String> = pref_config.get("user_agent").ok();
                let request_timeout: Option<u64> = pref_config.get("request_timeout").ok();
                let initial_poll_delay_ms: Option<u64> =
                    pref_config.get("initial_poll_delay_ms").ok();
                let poll_interval_ms: Option<u64> = pref_config.get("poll_interval_ms").ok();
                let max_poll_attempts: Option<u32> =
                    pref_config.get("max_poll_attempts").ok();

                Config {
                    api_endpoint,
                    user_agent,
                    request_timeout,
                    initial_poll_delay_ms,
                    poll_interval_ms,
                    max_poll_attempts,
                }
            }
            Err(_) => {
                // No config file found, use defaults
                tracing::debug!("No docdesk config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref endpoint) = self.api_endpoint {
            settings.api_endpoint = endpoint.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(delay) = self.initial_poll_delay_ms {
            settings.initial_poll_delay_ms = delay;
        }
        if let Some(interval) = self.poll_interval_ms {
            settings.poll_interval_ms = interval;
        }
        if let Some(max) = self.max_poll_attempts {
            settings.max_poll_attempts = if max == 0 { None } else { Some(max) };
        }
    }
}

/// Load settings from configuration (async version).
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.initial_poll_delay(), Duration::from_secs(3));
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
        assert_eq!(settings.max_poll_attempts, Some(DEFAULT_MAX_POLL_ATTEMPTS));
        assert!(settings.user_agent.is_none());
    }

    #[test]
    fn test_apply_to_settings() {
        let config = Config {
            api_endpoint: Some("https://docs.example.com/v1".to_string()),
            request_timeout: Some(10),
            poll_interval_ms: Some(250),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings);

        assert_eq!(settings.api_endpoint, "https://docs.example.com/v1");
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.poll_interval(), Duration::from_millis(250));
        // Untouched fields keep their defaults
        assert_eq!(settings.initial_poll_delay_ms, 3000);
    }

    #[test]
    fn test_zero_max_attempts_disables_limit() {
        let config = Config {
            max_poll_attempts: Some(0),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings);
        assert_eq!(settings.max_poll_attempts, None);
    }

    #[test]
    fn test_config_deserializes_partial_file() {
        let config: Config =
            serde_json::from_str(r#"{"api_endpoint": "http://x", "max_poll_attempts": 5}"#)
                .unwrap();
        assert_eq!(config.api_endpoint.as_deref(), Some("http://x"));
        assert_eq!(config.max_poll_attempts, Some(5));
        assert!(config.poll_interval_ms.is_none());
    }
}
