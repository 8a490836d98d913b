//! Message formatting for Telegram
//!
//! Telegram's MarkdownV2 renderer treats a fixed set of characters as markup.
//! Summary text is escaped so those characters render literally, while the
//! `*` emphasis markers of the message template are left alone.

use crate::pipeline::SummaryResult;
use serde::Serialize;

/// Maximum message length accepted by Telegram, in characters
pub const MESSAGE_LIMIT: usize = 4096;

/// Characters that must be preceded by a backslash in MarkdownV2 text
pub const RESERVED_CHARS: &[char] = &[
    '_', '`', '[', ']', '(', ')', '~', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

const ESCAPE_MARKER: char = '\\';

/// Label of the inline button linking to the full article
const READ_MORE_LABEL: &str = "Read more";

/// An inline keyboard button that opens a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkButton {
    pub text: String,
    pub url: String,
}

/// A single logical message, before escaping and splitting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// Unescaped message text
    pub text: String,

    /// Optional "read more" button, only sent with unsplit messages
    pub link: Option<LinkButton>,
}

impl NotificationMessage {
    /// Builds the message announcing a fetched summary
    pub fn from_summary(summary: &SummaryResult) -> Self {
        let mut text = format!(
            "✅ *Topic:* {}\n📄 *Summary:* {}",
            summary.title, summary.extract
        );

        let link = summary.page_url.as_ref().map(|url| {
            text.push_str("\n🔗 ");
            text.push_str(url);
            LinkButton {
                text: READ_MORE_LABEL.to_string(),
                url: url.clone(),
            }
        });

        Self { text, link }
    }
}

/// Escapes every reserved MarkdownV2 character with a backslash
///
/// All other characters, including `*` and `\`, pass through unchanged.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if RESERVED_CHARS.contains(&c) {
            escaped.push(ESCAPE_MARKER);
        }
        escaped.push(c);
    }
    escaped
}

/// Splits text into chunks that each fit in one Telegram message
pub fn split_message(text: &str) -> Vec<String> {
    split_with_limit(text, MESSAGE_LIMIT)
}

/// Splits text into trimmed, non-empty chunks of at most `limit` characters
///
/// Each cut is made at the last line break inside the window. A window with no
/// line break is cut at the limit, stepping back one character if that would
/// strand an escape marker at the end of the chunk. Text that already fits is
/// returned as a single trimmed chunk.
pub fn split_with_limit(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(2);
    let mut chunks = Vec::new();
    let mut rest = text.trim();

    while rest.chars().count() > limit {
        let window_end = char_boundary(rest, limit);
        let window = &rest[..window_end];

        let cut = match window.rfind('\n') {
            Some(pos) if pos > 0 => pos,
            _ => hard_cut(window),
        };

        let chunk = rest[..cut].trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        rest = rest[cut..].trim_start();
    }

    if chunks.is_empty() || !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

/// Byte offset just past the first `n` characters of `s`
fn char_boundary(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

fn hard_cut(window: &str) -> usize {
    if window.ends_with(ESCAPE_MARKER) {
        window.len() - ESCAPE_MARKER.len_utf8()
    } else {
        window.len()
    }
}
