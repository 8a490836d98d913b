//! Configuration module for Wiki-Relay
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! file, and reading the Telegram secrets from the environment.
//!
//! # Example
//!
//! ```no_run
//! use wiki_relay::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Fetching with concurrency: {}", config.concurrency);
//! ```

mod parser;
mod secrets;
mod types;
mod validation;

// Re-export types
pub use types::Config;

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

pub use secrets::{credentials_for, TelegramCredentials, TELEGRAM_CHAT_ID_VAR, TELEGRAM_TOKEN_VAR};
