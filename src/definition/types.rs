use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Original-language data for a word (Hebrew, Aramaic or Koine Greek).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginalWord {
    pub word: String,
    pub transliteration: String,
    /// Strong's lexicon number, e.g. `G26` or `H430`.
    pub strongs_number: String,
    pub root: String,
    pub literal_meaning: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Explanations {
    pub basic: String,
    pub intermediate: String,
}

/// The lexical payload produced by a generation provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDefinition {
    pub greek_hebrew: OriginalWord,
    pub explanations: Explanations,
}

/// A stored word definition.
///
/// Records are immutable once persisted; the first record written for a
/// `(word, verse_ref)` pair is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDefinition {
    pub word: String,
    pub verse_ref: String,
    pub greek_hebrew: OriginalWord,
    pub explanations: Explanations,
    pub ai_generated: bool,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl WordDefinition {
    pub fn generated(word: &str, verse_ref: &str, parsed: ParsedDefinition) -> Self {
        Self {
            word: word.to_string(),
            verse_ref: verse_ref.to_string(),
            greek_hebrew: parsed.greek_hebrew,
            explanations: parsed.explanations,
            ai_generated: true,
            verified: false,
            created_at: Utc::now(),
        }
    }
}

/// Body of `POST /api/word`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordRequest {
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default, rename = "verseRef")]
    pub verse_ref: Option<String>,
    #[serde(default, rename = "verseContext")]
    pub verse_context: Option<String>,
}

/// Tier counters for a running service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefinitionStats {
    pub memory_hits: u64,
    pub store_hits: u64,
    pub generations: u64,
    pub coalesced: u64,
    pub persist_races: u64,
    pub failures: u64,
    pub memory_entries: usize,
}
