//! Wiki-Relay: topic summaries, delivered to a chat
//!
//! This crate looks up short encyclopedia summaries for a list of topics and
//! forwards each one as a Telegram message, with bounded concurrency and a
//! per-topic retry budget.

pub mod config;
pub mod notify;
pub mod pipeline;
pub mod topics;

use thiserror::Error;

/// Main error type for Wiki-Relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    Decode { url: String, source: reqwest::Error },

    #[error("Telegram rejected message (HTTP {status}): {body}")]
    Telegram { status: u16, body: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Classifies a transport error raised while requesting `url`
    pub fn from_transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            RelayError::Timeout {
                url: url.to_string(),
            }
        } else {
            RelayError::Http {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing required environment variable: {0}")]
    MissingSecret(&'static str),
}

/// Result type alias for Wiki-Relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, TelegramCredentials};
pub use pipeline::{Coordinator, FetchOutcome, RunSummary, SummaryResult};
pub use topics::Topic;
