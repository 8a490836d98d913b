use serde::Deserialize;
use std::path::PathBuf;

/// Default public encyclopedia host
pub const DEFAULT_WIKI_API_URL: &str = "https://en.wikipedia.org";

/// Default Telegram Bot API host
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Main configuration structure for Wiki-Relay
///
/// Every key is optional; a missing key takes the documented default.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the topic list, one topic per line
    #[serde(default = "default_topics_file")]
    pub topics_file: PathBuf,

    /// Maximum number of topics fetched at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Number of attempts allowed per topic
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Whether summaries are forwarded to Telegram
    #[serde(default = "default_telegram_enabled")]
    pub telegram_enabled: bool,

    /// Base URL of the summary API
    #[serde(default = "default_wiki_api_url")]
    pub wiki_api_url: String,

    /// Base URL of the Telegram Bot API
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topics_file: default_topics_file(),
            concurrency: default_concurrency(),
            max_retries: default_max_retries(),
            telegram_enabled: default_telegram_enabled(),
            wiki_api_url: default_wiki_api_url(),
            telegram_api_url: default_telegram_api_url(),
        }
    }
}

fn default_topics_file() -> PathBuf {
    PathBuf::from("topics.txt")
}

fn default_concurrency() -> usize {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_telegram_enabled() -> bool {
    true
}

fn default_wiki_api_url() -> String {
    DEFAULT_WIKI_API_URL.to_string()
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_string()
}
