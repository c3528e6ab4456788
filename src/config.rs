//! Configuration file parser for the optional `--config <FILE>` TOML file.
//!
//! Every key is optional. Without a file, or for keys the file leaves out,
//! the built-in Feissarimokat settings apply. Unknown keys are accepted by
//! serde (with `deny_unknown_fields` off), though we log a warning for each
//! one since it is usually a typo.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::content::{DEFAULT_CONTENT_SELECTOR, DEFAULT_IMAGE_BASE_URL};
use crate::output::DEFAULT_AUTHOR;
use crate::util::{default_user_agent, DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_TIMEOUT};

/// Upstream feed the tool rebuilds.
pub const DEFAULT_FEED_URL: &str = "https://static.feissarimokat.com/dynamic/latest/posts.rss";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid URL for `{key}`: {message}")]
    InvalidUrl { key: &'static str, message: String },

    #[error("Invalid value for `{key}`: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("Invalid content selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Run configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// RSS document to rebuild.
    pub feed_url: String,

    /// Origin prepended to root-relative image paths.
    pub image_base_url: String,

    /// CSS selector of the element holding the post body on item pages.
    pub content_selector: String,

    /// Client-agent string override. `None` uses the built-in
    /// `FeissariRSS/<version> (...)` string.
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum response body size for the feed and for each page.
    pub max_response_bytes: usize,

    /// Item pages fetched at once. Output order does not depend on it.
    pub concurrency: usize,

    /// Author name on the Atom feed.
    pub author: String,

    /// Output file name override. `None` uses the format's default.
    pub output_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            content_selector: DEFAULT_CONTENT_SELECTOR.to_string(),
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            concurrency: 1,
            author: DEFAULT_AUTHOR.to_string(),
            output_file: None,
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 9] = [
        "feed_url",
        "image_base_url",
        "content_selector",
        "user_agent",
        "timeout_secs",
        "max_response_bytes",
        "concurrency",
        "author",
        "output_file",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Err(ConfigError::Io)`; the path was asked for explicitly
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML or wrong value types → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    /// - Invalid values → `Err` from [`Config::validate`]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading to prevent memory exhaustion
        // from a maliciously large or corrupted config file.
        let meta = std::fs::metadata(path)?;
        if meta.len() > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "Config file is {} bytes (max {} bytes)",
                meta.len(),
                Self::MAX_FILE_SIZE
            )));
        }

        let content = std::fs::read_to_string(path)?;

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(path = %path.display(), feed_url = %config.feed_url, "Loaded configuration");
        Ok(config)
    }

    /// Checks values serde cannot: URL shape and non-zero limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("feed_url", &self.feed_url)?;
        validate_http_url("image_base_url", &self.image_base_url)?;

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_response_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_response_bytes",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(default_user_agent)
    }

    /// Page fetches in flight at once; `0` is treated as `1`.
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

fn validate_http_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        key,
        message: format!("{}: {}", value, e),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::InvalidUrl {
            key,
            message: format!("unsupported scheme `{}` (only http/https allowed)", scheme),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
