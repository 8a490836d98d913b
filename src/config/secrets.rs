//! Telegram secrets, read from the environment
//!
//! A `.env` file in the working directory is honoured (via `dotenvy`) before
//! the process environment is consulted.

use crate::config::types::Config;
use crate::ConfigError;

/// Environment variable holding the bot token
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";

/// Environment variable holding the destination chat id
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Bot token and destination chat for notification delivery
#[derive(Clone)]
pub struct TelegramCredentials {
    pub token: String,
    pub chat_id: String,
}

// The token is a bearer secret; keep it out of logs.
impl std::fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramCredentials {
    /// Reads the credentials from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the credentials through an arbitrary variable lookup
    ///
    /// Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingSecret(name))
        };

        Ok(Self {
            token: read(TELEGRAM_TOKEN_VAR)?,
            chat_id: read(TELEGRAM_CHAT_ID_VAR)?,
        })
    }
}

/// Loads credentials only when the configuration needs them
///
/// # Returns
///
/// * `Ok(None)` - Notifications are disabled, nothing was read
/// * `Ok(Some(_))` - Notifications are enabled and both secrets are present
/// * `Err(ConfigError::MissingSecret)` - Notifications are enabled but a secret is missing
pub fn credentials_for(config: &Config) -> Result<Option<TelegramCredentials>, ConfigError> {
    if !config.telegram_enabled {
        return Ok(None);
    }
    TelegramCredentials::from_env().map(Some)
}
