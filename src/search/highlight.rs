//! Highlight span generation.
//!
//! All terms are compiled into one escaped, case-insensitive alternation and
//! markers are inserted in a single pass over the original text, so matches
//! never nest and removing the markers restores the input exactly.

use regex::{Regex, RegexBuilder};

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

pub struct Highlighter {
    pattern: Regex,
}

impl Highlighter {
    /// Builds a highlighter for the given terms.
    ///
    /// Returns `None` when there is nothing to highlight or the combined
    /// pattern exceeds the regex engine's size limits.
    pub fn new(terms: &[String]) -> Option<Self> {
        let mut terms: Vec<&str> = terms
            .iter()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return None;
        }
        // Longest first so overlapping terms mark the widest span.
        terms.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        terms.dedup();

        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        match RegexBuilder::new(&alternation).case_insensitive(true).build() {
            Ok(pattern) => Some(Self { pattern }),
            Err(e) => {
                tracing::warn!("Highlight pattern rejected: {}", e);
                None
            }
        }
    }

    pub fn highlight(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 16);
        let mut last = 0;
        for m in self.pattern.find_iter(text) {
            if m.start() == m.end() {
                continue;
            }
            out.push_str(&text[last..m.start()]);
            out.push_str(MARK_OPEN);
            out.push_str(m.as_str());
            out.push_str(MARK_CLOSE);
            last = m.end();
        }
        out.push_str(&text[last..]);
        out
    }
}

pub fn strip_marks(text: &str) -> String {
    text.replace(MARK_OPEN, "").replace(MARK_CLOSE, "")
}
