use crate::search::types::Verse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Namespace shared by every chapter entry in client-local storage.
pub const CACHE_PREFIX: &str = "bible-chapter-";

/// Seven days, in milliseconds.
pub const CACHE_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterKey {
    pub translation: String,
    pub book: u32,
    pub chapter: u32,
}

impl ChapterKey {
    /// Translation codes are case-insensitive and stored upper-case.
    pub fn new(translation: &str, book: u32, chapter: u32) -> Self {
        Self {
            translation: translation.trim().to_uppercase(),
            book,
            chapter,
        }
    }

    /// `bible-chapter-{translation}-{book}-{chapter}`
    pub fn storage_key(&self) -> String {
        format!(
            "{}{}-{}-{}",
            CACHE_PREFIX, self.translation, self.book, self.chapter
        )
    }

    pub fn parse(key: &str) -> Option<Self> {
        let rest = key.strip_prefix(CACHE_PREFIX)?;
        let mut parts = rest.rsplitn(3, '-');
        let chapter = parts.next()?.parse().ok()?;
        let book = parts.next()?.parse().ok()?;
        let translation = parts.next()?;
        if translation.is_empty()
            || !translation
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_')
        {
            return None;
        }
        Some(Self::new(translation, book, chapter))
    }
}

/// Stored value: the verses plus the epoch-millisecond write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedChapter {
    pub data: Vec<Verse>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryInfo {
    pub key: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub chapter_count: usize,
    pub total_bytes: u64,
    pub total_size: String,
    pub translation_stats: BTreeMap<String, usize>,
    pub oldest_entry: Option<CacheEntryInfo>,
    pub newest_entry: Option<CacheEntryInfo>,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self {
            chapter_count: 0,
            total_bytes: 0,
            total_size: "0 B".to_string(),
            translation_stats: BTreeMap::new(),
            oldest_entry: None,
            newest_entry: None,
        }
    }
}

/// A chapter read that may have fallen back to an out-of-date copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRead {
    pub verses: Vec<Verse>,
    pub stale: bool,
}
