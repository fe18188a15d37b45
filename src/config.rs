//! Configuration for the gallery feed
//!
//! A feed is described by a [`FeedConfig`], either built in code through
//! [`FeedConfig::builder`] or loaded from a YAML/JSON file.
//!
//! ```yaml
//! base_url: https://picsum.photos
//! path: /v2/list
//! page_size: 20
//! timeout_ms: 10000
//! retry:
//!   max_attempts: 3
//!   initial_delay_ms: 1000
//!   backoff_multiplier: 2.0
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Feed Config
// ============================================================================

/// Complete feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the remote resource
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the pagination endpoint
    #[serde(default = "default_path")]
    pub path: String,

    /// Items requested per page (`limit` query parameter)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Request deadline in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Fraction of the sentinel that must be on screen to count as visible
    #[serde(default = "default_threshold")]
    pub sentinel_threshold: f64,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_path() -> String {
    "/photos".to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_threshold() -> f64 {
    0.1
}

fn default_user_agent() -> String {
    format!("gallery-feed/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_path(),
            page_size: default_page_size(),
            timeout_ms: default_timeout_ms(),
            retry: RetryConfig::default(),
            sentinel_threshold: default_threshold(),
            headers: HashMap::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl FeedConfig {
    /// Create a new config builder
    pub fn builder() -> FeedConfigBuilder {
        FeedConfigBuilder::default()
    }

    /// Request deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load a config from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse a config from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::invalid_value("base_url", "cannot be empty"));
        }
        url::Url::parse(&self.base_url)?;

        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }
        if self.timeout_ms == 0 {
            return Err(Error::invalid_value("timeout_ms", "must be positive"));
        }
        if !(self.sentinel_threshold > 0.0 && self.sentinel_threshold <= 1.0) {
            return Err(Error::invalid_value(
                "sentinel_threshold",
                "must be within (0, 1]",
            ));
        }
        self.retry.validate()
    }
}

// ============================================================================
// Retry Config
// ============================================================================

/// Bounded exponential backoff settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Automatic retries allowed before the error becomes terminal
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Factor applied to the delay for each further attempt
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    /// Base backoff delay
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    fn validate(&self) -> Result<()> {
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(Error::invalid_value(
                "retry.backoff_multiplier",
                "must be a finite number >= 1",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`FeedConfig`]
#[derive(Default)]
pub struct FeedConfigBuilder {
    config: FeedConfig,
}

impl FeedConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the endpoint path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the page size
    pub fn page_size(mut self, size: u32) -> Self {
        self.config.page_size = size;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the retry cap
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.retry.max_attempts = attempts;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, initial: Duration, multiplier: f64) -> Self {
        self.config.retry.initial_delay_ms = initial.as_millis() as u64;
        self.config.retry.backoff_multiplier = multiplier;
        self
    }

    /// Set the sentinel visibility threshold
    pub fn sentinel_threshold(mut self, threshold: f64) -> Self {
        self.config.sentinel_threshold = threshold;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> FeedConfig {
        self.config
    }
}
