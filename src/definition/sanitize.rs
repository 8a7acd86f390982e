//! Input validation for word lookups.
//!
//! Runs before any cache or store access. Characters that carry meaning in
//! document-store query languages (`{ } [ ] $`) and control characters are
//! stripped from free text; the verse reference must match an allow-list.

use super::error::DefinitionError;

pub const MAX_WORD_CHARS: usize = 100;
pub const MAX_VERSE_REF_CHARS: usize = 50;
pub const MAX_CONTEXT_CHARS: usize = 500;

/// Separates the word from the verse reference in cache keys. It can occur
/// in neither part after validation.
pub const KEY_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLookup {
    pub word: String,
    pub verse_ref: String,
    pub context: String,
}

impl ValidatedLookup {
    pub fn cache_key(&self) -> String {
        cache_key(&self.word, &self.verse_ref)
    }
}

pub fn cache_key(word: &str, verse_ref: &str) -> String {
    format!("{}{}{}", word, KEY_SEPARATOR, verse_ref)
}

fn is_query_operator(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | '$') || c.is_control()
}

pub fn strip_query_operators(input: &str) -> String {
    input.chars().filter(|c| !is_query_operator(*c)).collect()
}

fn is_allowed_ref_char(c: char) -> bool {
    c.is_alphabetic() || c.is_ascii_digit() || matches!(c, ' ' | ':' | '.' | '-')
}

pub fn validate_word(word: &str) -> Result<String, DefinitionError> {
    let word = strip_query_operators(word).trim().to_lowercase();
    let len = word.chars().count();
    if len == 0 || len > MAX_WORD_CHARS {
        return Err(DefinitionError::Validation(format!(
            "word must be 1-{} characters",
            MAX_WORD_CHARS
        )));
    }
    Ok(word)
}

pub fn validate_verse_ref(verse_ref: &str) -> Result<String, DefinitionError> {
    let verse_ref = verse_ref.trim();
    let len = verse_ref.chars().count();
    if len == 0 || len > MAX_VERSE_REF_CHARS {
        return Err(DefinitionError::Validation(format!(
            "verseRef must be 1-{} characters",
            MAX_VERSE_REF_CHARS
        )));
    }
    if !verse_ref.chars().all(is_allowed_ref_char) {
        return Err(DefinitionError::Validation(
            "verseRef contains invalid characters".to_string(),
        ));
    }
    Ok(verse_ref.to_string())
}

pub fn sanitize_context(context: &str) -> String {
    strip_query_operators(context)
        .trim()
        .chars()
        .take(MAX_CONTEXT_CHARS)
        .collect()
}

pub fn validate_lookup(
    word: &str,
    verse_ref: &str,
    context: &str,
) -> Result<ValidatedLookup, DefinitionError> {
    Ok(ValidatedLookup {
        word: validate_word(word)?,
        verse_ref: validate_verse_ref(verse_ref)?,
        context: sanitize_context(context),
    })
}
