//! Error types for the gallery feed
//!
//! Every failure the feed can run into is expressed as an [`Error`]. Fetch
//! failures never escape the engine: they are classified into a
//! [`FailureKind`] and turned into a single user-facing message.

use thiserror::Error;

/// Message shown while the device has no connection
pub const OFFLINE_MESSAGE: &str =
    "No internet connection. Please check your network and try again.";

/// Message shown when a page request hits its deadline
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please check your internet connection.";

/// Message shown for failures that fit no other category
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// The main error type for the gallery feed
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    #[error("Device is offline")]
    Offline,

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP {status} {reason}: {body}")]
    HttpStatus {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Unexpected failure: {message}")]
    Unexpected { message: String },

    // ============================================================================
    // Feed Errors
    // ============================================================================
    #[error("Feed has been torn down")]
    Closed,

    #[error("Gallery stopped: {message}")]
    Stopped { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

/// Failure taxonomy used for user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Device lost its connection
    Offline,
    /// Request aborted at its deadline
    Timeout,
    /// Server answered with a non-success status
    Http { status: u16 },
    /// Any other transport failure
    Network,
    /// Anything else
    Unexpected,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default();
        Self::HttpStatus {
            status,
            reason: reason.to_string(),
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Classify this error for the fetch taxonomy
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Offline => FailureKind::Offline,
            Error::Timeout { .. } => FailureKind::Timeout,
            Error::Http(e) if e.is_timeout() => FailureKind::Timeout,
            Error::HttpStatus { status, .. } => FailureKind::Http { status: *status },
            Error::Http(e) => match e.status() {
                Some(status) => FailureKind::Http {
                    status: status.as_u16(),
                },
                None => FailureKind::Network,
            },
            Error::Io(_) | Error::Decode { .. } => FailureKind::Network,
            _ => FailureKind::Unexpected,
        }
    }

    /// Check if this error is retryable
    ///
    /// Every fetch failure is retried under backoff; configuration and
    /// lifecycle errors are not.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Error::Config { .. }
                | Error::InvalidConfigValue { .. }
                | Error::YamlParse(_)
                | Error::InvalidUrl(_)
                | Error::FileNotFound { .. }
                | Error::Closed
        )
    }

    /// Build the message shown in place of the gallery
    pub fn user_message(&self) -> String {
        match self.kind() {
            FailureKind::Offline => OFFLINE_MESSAGE.to_string(),
            FailureKind::Timeout => TIMEOUT_MESSAGE.to_string(),
            FailureKind::Http { .. } | FailureKind::Network => {
                format!("Failed to load photos: {self}")
            }
            FailureKind::Unexpected => UNEXPECTED_MESSAGE.to_string(),
        }
    }
}

/// Result type alias for the gallery feed
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::http_status(404, "gone");
        assert_eq!(err.to_string(), "HTTP 404 Not Found: gone");

        let err = Error::Timeout { timeout_ms: 1500 };
        assert_eq!(err.to_string(), "Request timeout after 1500ms");
    }

    #[test]
    fn test_kind() {
        assert_eq!(Error::Offline.kind(), FailureKind::Offline);
        assert_eq!(
            Error::Timeout { timeout_ms: 1 }.kind(),
            FailureKind::Timeout
        );
        assert_eq!(
            Error::http_status(503, "").kind(),
            FailureKind::Http { status: 503 }
        );
        assert_eq!(Error::decode("bad body").kind(), FailureKind::Network);
        assert_eq!(Error::unexpected("boom").kind(), FailureKind::Unexpected);
    }

    #[test]
    fn test_user_message() {
        assert_eq!(Error::Offline.user_message(), OFFLINE_MESSAGE);
        assert_eq!(
            Error::Timeout { timeout_ms: 10 }.user_message(),
            TIMEOUT_MESSAGE
        );
        assert_eq!(
            Error::http_status(500, "").user_message(),
            "Failed to load photos: HTTP 500 Internal Server Error: "
        );
        assert_eq!(Error::unexpected("?").user_message(), UNEXPECTED_MESSAGE);
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::Offline.is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(404, "").is_retryable());
        assert!(Error::decode("x").is_retryable());

        assert!(!Error::config("test").is_retryable());
        assert!(!Error::Closed.is_retryable());
    }
}
