use super::books::lookup_book;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use regex::Regex;

/// A partially specified scripture locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub book: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse: Option<u32>,
}

impl Reference {
    pub fn matches(&self, book: u32, chapter: u32, verse: u32) -> bool {
        self.book == book
            && self.chapter.is_none_or(|c| c == chapter)
            && self.verse.is_none_or(|v| v == verse)
    }
}

// Book tokens are matched lazily so a trailing integer binds to the chapter.
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\p{L}\d\s]+?)\s*(\d+)?(?::(\d+))?$").expect("reference pattern is valid")
});

/// Interprets a free-text query as `<book> [chapter][:verse]`.
///
/// Returns `None` when the query is not shaped like a reference or the book
/// tokens do not name a known book; callers fall back to text search.
pub fn parse_reference(query: &str) -> Option<Reference> {
    let query = query.trim().to_lowercase();
    let captures = REFERENCE_PATTERN.captures(&query)?;

    let book_query = captures
        .get(1)?
        .as_str()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    // A number that does not fit is not a reference at all.
    let chapter = captures.get(2).map(|m| m.as_str().parse::<u32>()).transpose().ok()?;
    let verse = captures.get(3).map(|m| m.as_str().parse::<u32>()).transpose().ok()?;

    let book = lookup_book(&book_query)?;

    Some(Reference {
        book,
        chapter,
        verse,
    })
}
