//! Application configuration.

use crate::error::{AppError, AppResult};
use ais_api::ServerConfig;
use ais_feed::{BoundingBox, FeedConfig, DEFAULT_FEED_URL, GLOBAL_BOUNDING_BOX};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the AISStream API credential.
pub const API_KEY_ENV: &str = "AIS_API_KEY";

/// Feed configuration subset exposed in the config file.
///
/// The API key is deliberately not part of this struct; it is a secret and
/// comes from the environment (see [`AppConfig::resolve_api_key`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    /// Maximum consecutive connection attempts before the feed goes idle.
    #[serde(default = "default_max_connect_attempts")]
    pub max_connect_attempts: u32,
    /// Fixed delay between reconnection attempts (ms).
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Subscribed regions. Defaults to full-globe coverage.
    #[serde(default = "default_bounding_boxes")]
    pub bounding_boxes: Vec<BoundingBox>,
    /// Message types requested from the feed.
    #[serde(default = "default_message_types")]
    pub message_types: Vec<String>,
}

fn default_max_connect_attempts() -> u32 {
    5
}

fn default_reconnect_delay_ms() -> u64 {
    5000
}

fn default_bounding_boxes() -> Vec<BoundingBox> {
    vec![GLOBAL_BOUNDING_BOX]
}

fn default_message_types() -> Vec<String> {
    vec!["PositionReport".to_string()]
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            max_connect_attempts: default_max_connect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            bounding_boxes: default_bounding_boxes(),
            message_types: default_message_types(),
        }
    }
}

/// Message store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Number of raw messages retained.
    #[serde(default = "default_store_capacity")]
    pub capacity: usize,
}

fn default_store_capacity() -> usize {
    ais_store::store::DEFAULT_CAPACITY
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            capacity: default_store_capacity(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream WebSocket endpoint URL.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Feed configuration.
    #[serde(default)]
    pub feed: FeedSettings,
    /// Message store configuration.
    #[serde(default)]
    pub store: StoreSettings,
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_ws_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            feed: FeedSettings::default(),
            store: StoreSettings::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load from the given path, falling back to defaults if it is absent.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(%path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Resolve the upstream API credential from the environment.
    pub fn resolve_api_key(&self) -> AppResult<String> {
        std::env::var(API_KEY_ENV).map_err(|_| {
            AppError::Config(format!("{API_KEY_ENV} environment variable is not set"))
        })
    }

    /// Build the feed connection configuration.
    pub fn feed_config(&self, api_key: String) -> FeedConfig {
        FeedConfig {
            url: self.ws_url.clone(),
            api_key,
            bounding_boxes: self.feed.bounding_boxes.clone(),
            message_types: self.feed.message_types.clone(),
            max_connect_attempts: self.feed.max_connect_attempts,
            reconnect_delay_ms: self.feed.reconnect_delay_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.ws_url, DEFAULT_FEED_URL);
        assert_eq!(config.feed.max_connect_attempts, 5);
        assert_eq!(config.feed.reconnect_delay_ms, 5000);
        assert_eq!(config.store.capacity, 1000);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_partial_toml_uses_field_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [feed]
            reconnect_delay_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.feed.reconnect_delay_ms, 1000);
        assert_eq!(config.feed.max_connect_attempts, 5);
        assert_eq!(config.ws_url, DEFAULT_FEED_URL);
    }

    #[test]
    fn test_feed_config_from_settings() {
        let config = AppConfig::default();
        let feed = config.feed_config("secret".to_string());
        assert_eq!(feed.api_key, "secret");
        assert_eq!(feed.url, DEFAULT_FEED_URL);
        assert_eq!(feed.bounding_boxes, vec![GLOBAL_BOUNDING_BOX]);
        assert_eq!(feed.message_types, vec!["PositionReport".to_string()]);
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("ws_url"));
        assert!(toml_str.contains("max_connect_attempts"));
        // The secret never appears in serialized config.
        assert!(!toml_str.contains("api_key"));
    }
}
