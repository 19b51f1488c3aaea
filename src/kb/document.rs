//! Document and search result types.

use serde::{Deserialize, Serialize};

/// A knowledge-base document. Identity is the id: two documents with the
/// same id are the same document (upsert semantics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doc {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl Doc {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// A single ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    pub id: String,
    pub title: String,
    pub snippet: String,
    pub score: f64,
}

/// Truncate `s` to at most `max` code points. Never splits a code point;
/// `max == 0` returns the input unchanged.
pub fn snippet(s: &str, max: usize) -> String {
    if max == 0 {
        return s.to_string();
    }
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
