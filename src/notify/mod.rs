//! Notification module for forwarding summaries to Telegram
//!
//! This module contains:
//! - Message formatting, MarkdownV2 escaping and size-bounded splitting
//! - Best-effort delivery to the Telegram Bot API

mod format;
mod telegram;

pub use format::{
    escape_markdown, split_message, split_with_limit, LinkButton, NotificationMessage,
    MESSAGE_LIMIT, RESERVED_CHARS,
};
pub use telegram::{TelegramNotifier, PARSE_MODE, SEND_TIMEOUT};
