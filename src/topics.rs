//! Topic list reading
//!
//! A topic list is UTF-8 text with one topic per line. Surrounding whitespace
//! is trimmed and blank lines are skipped.

use std::fmt;
use std::path::Path;

/// A non-empty subject string to look up
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Creates a topic from raw text, trimming it
    ///
    /// Returns `None` when nothing is left after trimming.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses a topic list, one topic per non-blank line
pub fn parse_topics(content: &str) -> Vec<Topic> {
    content.lines().filter_map(Topic::new).collect()
}

/// Reads and parses a topic list file
///
/// # Returns
///
/// * `Ok(Vec<Topic>)` - Topics in file order
/// * `Err(std::io::Error)` - The file could not be read or is not UTF-8
pub fn load_topics(path: &Path) -> std::io::Result<Vec<Topic>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_topics(&content))
}
