use super::source::{ChapterError, ChapterSource};
use super::storage::{LocalStorage, StorageError};
use super::types::{
    CACHE_PREFIX, CACHE_TTL_MS, CacheEntryInfo, CacheStats, CachedChapter, ChapterKey, ChapterRead,
};
use crate::search::types::Verse;
use std::sync::Arc;

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Human-readable size with up to two decimals: `0 B`, `512 B`, `12.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Time-boxed cache of remote chapters in client-local storage.
///
/// Entries older than the TTL count as absent and are purged when next
/// read. Every non-empty fetch is written through, replacing any previous
/// entry and its timestamp.
pub struct ChapterCache {
    storage: Arc<dyn LocalStorage>,
    source: Arc<dyn ChapterSource>,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
}

impl ChapterCache {
    pub fn new(storage: Arc<dyn LocalStorage>, source: Arc<dyn ChapterSource>) -> Self {
        Self {
            storage,
            source,
            clock: Arc::new(SystemClock),
            ttl_ms: CACHE_TTL_MS,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn is_expired(&self, entry: &CachedChapter) -> bool {
        self.clock.now_ms() - entry.timestamp > self.ttl_ms
    }

    fn remove_logged(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            tracing::warn!("Failed to remove cache entry {}: {}", key, e);
        }
    }

    /// Reads an entry regardless of age. Unreadable or corrupt entries are
    /// removed and reported as absent.
    fn read_entry(&self, key: &str) -> Option<CachedChapter> {
        let raw = match self.storage.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Dropping corrupt cache entry {}: {}", key, e);
                self.remove_logged(key);
                None
            }
        }
    }

    fn write_entry(&self, key: &str, verses: &[Verse]) {
        let entry = CachedChapter {
            data: verses.to_vec(),
            timestamp: self.clock.now_ms(),
        };
        let result = serde_json::to_string(&entry)
            .map_err(|e| StorageError::Unavailable(e.to_string()))
            .and_then(|encoded| self.storage.set(key, &encoded));
        match result {
            Ok(()) => tracing::debug!("Cached {} ({} verses)", key, verses.len()),
            Err(e) => tracing::warn!("Failed to cache {}: {}", key, e),
        }
    }

    /// Fresh cached verses for `key`, purging the entry if it has expired.
    pub fn cached(&self, key: &ChapterKey) -> Option<Vec<Verse>> {
        let storage_key = key.storage_key();
        let entry = self.read_entry(&storage_key)?;
        if self.is_expired(&entry) {
            tracing::debug!("Cache entry {} expired", storage_key);
            self.remove_logged(&storage_key);
            return None;
        }
        Some(entry.data)
    }

    async fn fetch_and_store(&self, key: &ChapterKey) -> Result<Vec<Verse>, ChapterError> {
        let verses = self
            .source
            .fetch_chapter(&key.translation, key.book, key.chapter)
            .await?;
        if !verses.is_empty() {
            self.write_entry(&key.storage_key(), &verses);
        }
        Ok(verses)
    }

    /// Cached verses when `use_cache` is set and a fresh entry exists,
    /// otherwise a remote fetch. Fetch errors are returned unchanged.
    pub async fn get_chapter(
        &self,
        translation: &str,
        book: u32,
        chapter: u32,
        use_cache: bool,
    ) -> Result<Vec<Verse>, ChapterError> {
        let key = ChapterKey::new(translation, book, chapter);

        if use_cache && let Some(verses) = self.cached(&key) {
            tracing::debug!("Chapter cache hit for {}", key.storage_key());
            return Ok(verses);
        }

        self.fetch_and_store(&key).await
    }

    /// Like `get_chapter` with the cache enabled, but when the fetch fails a
    /// previously cached copy, even an expired one, is returned flagged stale.
    pub async fn get_chapter_or_stale(
        &self,
        translation: &str,
        book: u32,
        chapter: u32,
    ) -> Result<ChapterRead, ChapterError> {
        let key = ChapterKey::new(translation, book, chapter);
        let storage_key = key.storage_key();
        let snapshot = self.read_entry(&storage_key);

        if let Some(entry) = &snapshot
            && !self.is_expired(entry)
        {
            return Ok(ChapterRead {
                verses: entry.data.clone(),
                stale: false,
            });
        }

        // An expired copy stays in place until a fetch succeeds; a non-empty
        // result overwrites it, an empty one means the chapter is gone.
        match self.fetch_and_store(&key).await {
            Ok(verses) => {
                if verses.is_empty() && snapshot.is_some() {
                    self.remove_logged(&storage_key);
                }
                Ok(ChapterRead {
                    verses,
                    stale: false,
                })
            }
            Err(e) => match snapshot {
                Some(entry) => {
                    tracing::warn!("Serving stale {} after fetch failure: {}", storage_key, e);
                    Ok(ChapterRead {
                        verses: entry.data,
                        stale: true,
                    })
                }
                None => Err(e),
            },
        }
    }

    fn chapter_keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys: Vec<String> = self
            .storage
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(CACHE_PREFIX))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Removes every chapter entry. Returns how many were removed.
    pub fn clear_all(&self) -> usize {
        let keys = match self.chapter_keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("Cannot list chapter cache: {}", e);
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            match self.storage.remove(&key) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("Failed to remove cache entry {}: {}", key, e),
            }
        }
        tracing::info!("Cleared {} cached chapters", removed);
        removed
    }

    /// Removes expired and corrupt entries. Returns how many were removed.
    pub fn clear_expired(&self) -> usize {
        let keys = match self.chapter_keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("Cannot list chapter cache: {}", e);
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            let raw = match self.storage.get(&key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("Cache read failed for {}: {}", key, e);
                    continue;
                }
            };
            let drop_entry = match serde_json::from_str::<CachedChapter>(&raw) {
                Ok(entry) => self.is_expired(&entry),
                Err(_) => true,
            };
            if drop_entry {
                match self.storage.remove(&key) {
                    Ok(()) => removed += 1,
                    Err(e) => tracing::warn!("Failed to remove cache entry {}: {}", key, e),
                }
            }
        }
        tracing::info!("Purged {} expired chapters", removed);
        removed
    }

    /// Aggregate view of the cache. Never fails; storage errors yield the
    /// default (empty) report.
    pub fn get_stats(&self) -> CacheStats {
        match self.collect_stats() {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("Cache stats unavailable: {}", e);
                CacheStats::default()
            }
        }
    }

    fn collect_stats(&self) -> Result<CacheStats, StorageError> {
        let mut stats = CacheStats::default();

        for key in self.chapter_keys()? {
            let Some(raw) = self.storage.get(&key)? else {
                continue;
            };
            stats.chapter_count += 1;
            stats.total_bytes += raw.len() as u64;

            if let Some(parsed) = ChapterKey::parse(&key) {
                *stats.translation_stats.entry(parsed.translation).or_insert(0) += 1;
            }

            let Ok(entry) = serde_json::from_str::<CachedChapter>(&raw) else {
                continue;
            };
            let info = CacheEntryInfo {
                key: key.clone(),
                timestamp: entry.timestamp,
            };
            if stats
                .oldest_entry
                .as_ref()
                .is_none_or(|oldest| entry.timestamp < oldest.timestamp)
            {
                stats.oldest_entry = Some(info.clone());
            }
            if stats
                .newest_entry
                .as_ref()
                .is_none_or(|newest| entry.timestamp > newest.timestamp)
            {
                stats.newest_entry = Some(info);
            }
        }

        stats.total_size = format_bytes(stats.total_bytes);
        Ok(stats)
    }
}
