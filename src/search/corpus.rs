//! Reference corpus.
//!
//! The verse list is loaded once at start-up and shared read-only as
//! `Arc<Corpus>`. There is no index: every lookup is a linear scan in
//! canonical book/chapter/verse order.

use super::types::{BookInfo, TestamentCounts, Verse, WordFrequency};
use crate::reference::books::{Testament, book_name};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Default)]
pub struct Corpus {
    verses: Vec<Verse>,
}

impl Corpus {
    pub fn from_verses(verses: Vec<Verse>) -> Self {
        Self { verses }
    }

    /// Reads a JSON array of verses from disk.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading corpus {}", path.display()))?;
        let verses: Vec<Verse> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing corpus {}", path.display()))?;

        tracing::info!("Loaded {} verses from {}", verses.len(), path.display());
        Ok(Self { verses })
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    /// Verses of one chapter, ordered by verse number.
    pub fn chapter(&self, book: u32, chapter: u32) -> Vec<Verse> {
        let mut verses: Vec<Verse> = self
            .verses
            .iter()
            .filter(|v| v.book == book && v.chapter == chapter)
            .cloned()
            .collect();
        verses.sort_by_key(|v| v.verse);
        verses
    }

    pub fn verse(&self, book: u32, chapter: u32, verse: u32) -> Option<&Verse> {
        self.verses
            .iter()
            .find(|v| v.book == book && v.chapter == chapter && v.verse == verse)
    }

    pub fn book_info(&self, book: u32) -> Option<BookInfo> {
        book_name(book)?;

        let mut chapters = BTreeSet::new();
        let mut total_verses = 0;
        for verse in self.verses.iter().filter(|v| v.book == book) {
            chapters.insert(verse.chapter);
            total_verses += 1;
        }

        Some(BookInfo {
            book,
            total_chapters: chapters.iter().next_back().copied().unwrap_or(0),
            total_verses,
            chapters: chapters.into_iter().collect(),
        })
    }

    /// Case-insensitive literal occurrence count of `word` across the corpus.
    pub fn word_frequency(&self, word: &str) -> WordFrequency {
        let needle = word.trim().to_lowercase();
        let mut by_book = BTreeMap::new();
        let mut by_testament = TestamentCounts::default();

        if !needle.is_empty() {
            for verse in &self.verses {
                let count = verse.text.to_lowercase().matches(needle.as_str()).count();
                if count == 0 {
                    continue;
                }
                *by_book.entry(verse.book).or_insert(0) += count;
                match Testament::of(verse.book) {
                    Testament::Old => by_testament.old += count,
                    Testament::New => by_testament.new += count,
                }
            }
        }

        WordFrequency {
            word: word.to_string(),
            total: by_testament.old + by_testament.new,
            by_book,
            by_testament,
        }
    }
}
