//! Configuration module for mxrss.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{MxrssError, Result};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/mxrss/config.json";

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty means console-only logging.
    #[serde(default)]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Feed URLs to watch.
    #[serde(default)]
    pub feed_urls: Vec<String>,
    /// Base URL of the Matrix homeserver.
    #[serde(default = "default_matrix_server")]
    pub matrix_server: String,
    /// Room ID to post notifications into.
    #[serde(default = "default_matrix_room_id")]
    pub matrix_room_id: String,
    /// Access token for the notifying account.
    #[serde(default = "default_matrix_token")]
    pub matrix_token: String,
    /// Minutes to sleep between passes over the feed list.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_matrix_server() -> String {
    "https://matrix.org".to_string()
}

fn default_matrix_room_id() -> String {
    "!yourroomid:matrix.org".to_string()
}

fn default_matrix_token() -> String {
    "youraccesstoken".to_string()
}

fn default_check_interval() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_urls: vec![
                "https://example.com/feed1".to_string(),
                "https://example.com/feed2".to_string(),
            ],
            matrix_server: default_matrix_server(),
            matrix_room_id: default_matrix_room_id(),
            matrix_token: default_matrix_token(),
            check_interval: default_check_interval(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(MxrssError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn parse(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map_err(|e| MxrssError::Config(format!("config parse error: {e}")))
    }

    /// Write a template configuration to the given path, creating parent
    /// directories as needed.
    pub fn write_template<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let template = serde_json::to_string_pretty(&Config::default())
            .map_err(|e| MxrssError::Config(format!("failed to serialize template: {e}")))?;
        std::fs::write(path, template)?;
        Ok(())
    }

    /// Check whether the configuration still carries the template's
    /// placeholder values and was never edited by the operator.
    pub fn is_placeholder(&self) -> bool {
        let template = Config::default();
        self.feed_urls == template.feed_urls
            && self.matrix_server == template.matrix_server
            && self.matrix_room_id == template.matrix_room_id
            && self.matrix_token == template.matrix_token
            && self.check_interval == template.check_interval
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - `check_interval` is zero
    /// - `feed_urls` is empty or contains a non-http(s) URL
    /// - any Matrix field is empty or the server URL is invalid
    pub fn validate(&self) -> Result<()> {
        if self.check_interval == 0 {
            return Err(MxrssError::Config(
                "check_interval must be at least 1 minute".to_string(),
            ));
        }
        if self.feed_urls.is_empty() {
            return Err(MxrssError::Config(
                "feed_urls must contain at least one URL".to_string(),
            ));
        }
        for feed_url in &self.feed_urls {
            validate_http_url(feed_url)
                .map_err(|e| MxrssError::Config(format!("feed URL {feed_url}: {e}")))?;
        }
        validate_http_url(&self.matrix_server)
            .map_err(|e| MxrssError::Config(format!("matrix_server: {e}")))?;
        if self.matrix_room_id.is_empty() {
            return Err(MxrssError::Config("matrix_room_id is not set".to_string()));
        }
        if self.matrix_token.is_empty() {
            return Err(MxrssError::Config("matrix_token is not set".to_string()));
        }
        Ok(())
    }
}

/// Check that a URL parses and uses the http or https scheme.
fn validate_http_url(s: &str) -> std::result::Result<(), String> {
    let parsed = url::Url::parse(s).map_err(|e| format!("invalid URL: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(format!("unsupported URL scheme: {scheme}")),
    }
    if parsed.host().is_none() {
        return Err("URL has no host".to_string());
    }
    Ok(())
}
