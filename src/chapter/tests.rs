//! Chapter Cache Tests
//!
//! Drives the cache with a manual clock and a counting in-process source.

#[cfg(test)]
mod tests {
    use crate::chapter::cache::{ChapterCache, Clock, format_bytes};
    use crate::chapter::source::{BollsClient, ChapterError, ChapterSource};
    use crate::chapter::storage::{FileStorage, LocalStorage, MemoryStorage, StorageError};
    use crate::chapter::translation::{
        DEFAULT_TRANSLATION, TRANSLATION_KEY, TranslationSettings, find_translation,
    };
    use crate::chapter::types::{CACHE_TTL_MS, CachedChapter, ChapterKey};
    use crate::search::types::Verse;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    const T0: i64 = 1_700_000_000_000;

    struct ManualClock(AtomicI64);

    impl ManualClock {
        fn at(ms: i64) -> Arc<Self> {
            Arc::new(Self(AtomicI64::new(ms)))
        }

        fn advance(&self, ms: i64) {
            self.0.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        offline: AtomicBool,
        empty: AtomicBool,
    }

    impl CountingSource {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChapterSource for CountingSource {
        async fn fetch_chapter(
            &self,
            translation: &str,
            book: u32,
            chapter: u32,
        ) -> Result<Vec<Verse>, ChapterError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.offline.load(Ordering::SeqCst) {
                return Err(ChapterError::Transport("offline".to_string()));
            }
            if self.empty.load(Ordering::SeqCst) {
                return Ok(Vec::new());
            }
            Ok(vec![Verse {
                book,
                chapter,
                verse: 1,
                text: format!("{} fetch #{}", translation, call),
                comment: None,
            }])
        }
    }

    struct BrokenStorage;

    impl LocalStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("quota".to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota".to_string()))
        }
        fn keys(&self) -> Result<Vec<String>, StorageError> {
            Err(StorageError::Unavailable("quota".to_string()))
        }
    }

    struct Fixture {
        storage: Arc<MemoryStorage>,
        source: Arc<CountingSource>,
        clock: Arc<ManualClock>,
        cache: ChapterCache,
    }

    fn fixture() -> Fixture {
        let storage = Arc::new(MemoryStorage::new());
        let source = Arc::new(CountingSource::default());
        let clock = ManualClock::at(T0);
        let cache = ChapterCache::new(storage.clone(), source.clone()).with_clock(clock.clone());
        Fixture {
            storage,
            source,
            clock,
            cache,
        }
    }

    // --- Keys and formatting ---

    #[test]
    fn test_storage_key_round_trips_through_parse() {
        let key = ChapterKey::new("NRT", 43, 3);
        assert_eq!(key.storage_key(), "bible-chapter-NRT-43-3");
        assert_eq!(ChapterKey::parse("bible-chapter-NRT-43-3"), Some(key));
        assert_eq!(ChapterKey::parse("bible-translation"), None);
        assert_eq!(ChapterKey::parse("bible-chapter-NRT-x-3"), None);
        assert_eq!(ChapterKey::parse("bible-chapter--1-3"), None);
    }

    #[tokio::test]
    async fn test_translation_code_case_shares_one_entry() {
        let f = fixture();
        assert_eq!(ChapterKey::new(" nrt ", 43, 3), ChapterKey::new("NRT", 43, 3));

        let first = f.cache.get_chapter("nrt", 43, 3, true).await.unwrap();
        let second = f.cache.get_chapter("NRT", 43, 3, true).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(f.source.calls(), 1);
        assert_eq!(f.storage.keys().unwrap(), vec!["bible-chapter-NRT-43-3"]);
        let stats = f.cache.get_stats();
        assert_eq!(stats.chapter_count, 1);
        assert_eq!(stats.translation_stats.get("NRT"), Some(&1));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(12_800), "12.5 KB");
        assert_eq!(format_bytes(1536 * 1024), "1.5 MB");
        assert_eq!(format_bytes(1000), "1000 B");
    }

    // --- TTL ---

    #[tokio::test]
    async fn test_entry_served_within_ttl_and_refetched_after() {
        let f = fixture();

        let first = f.cache.get_chapter("NRT", 43, 3, true).await.unwrap();
        assert_eq!(f.source.calls(), 1);

        f.clock.advance(6 * DAY_MS);
        let cached = f.cache.get_chapter("NRT", 43, 3, true).await.unwrap();
        assert_eq!(cached, first);
        assert_eq!(f.source.calls(), 1);

        f.clock.advance(2 * DAY_MS);
        let refreshed = f.cache.get_chapter("NRT", 43, 3, true).await.unwrap();
        assert_eq!(f.source.calls(), 2);
        assert_ne!(refreshed, first);
    }

    #[tokio::test]
    async fn test_expired_entry_is_purged_on_read() {
        let f = fixture();
        f.cache.get_chapter("NRT", 1, 1, true).await.unwrap();

        f.clock.advance(CACHE_TTL_MS + 1);
        assert_eq!(f.cache.cached(&ChapterKey::new("NRT", 1, 1)), None);
        assert_eq!(f.storage.get("bible-chapter-NRT-1-1").unwrap(), None);
    }

    #[tokio::test]
    async fn test_bypass_refetches_and_resets_timestamp() {
        let f = fixture();
        f.cache.get_chapter("NIV", 19, 23, true).await.unwrap();

        f.clock.advance(5 * DAY_MS);
        let fresh = f.cache.get_chapter("NIV", 19, 23, false).await.unwrap();
        assert_eq!(f.source.calls(), 2);

        // The rewrite restarts the TTL window.
        f.clock.advance(5 * DAY_MS);
        assert_eq!(f.cache.get_chapter("NIV", 19, 23, true).await.unwrap(), fresh);
        assert_eq!(f.source.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_results_are_not_cached() {
        let f = fixture();
        f.source.empty.store(true, Ordering::SeqCst);

        assert!(f.cache.get_chapter("NRT", 70, 1, true).await.unwrap().is_empty());
        assert!(f.cache.get_chapter("NRT", 70, 1, true).await.unwrap().is_empty());
        assert_eq!(f.source.calls(), 2);
        assert!(f.storage.keys().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_errors_propagate() {
        let f = fixture();
        f.source.offline.store(true, Ordering::SeqCst);

        let err = f.cache.get_chapter("NRT", 1, 1, true).await.unwrap_err();
        assert!(matches!(err, ChapterError::Transport(_)));
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_treated_as_miss() {
        let f = fixture();
        f.storage.set("bible-chapter-NRT-1-1", "{not json").unwrap();

        let verses = f.cache.get_chapter("NRT", 1, 1, true).await.unwrap();
        assert_eq!(verses.len(), 1);
        assert_eq!(f.source.calls(), 1);
    }

    // --- Stale fallback ---

    #[tokio::test]
    async fn test_stale_copy_served_when_offline() {
        let f = fixture();
        let original = f.cache.get_chapter("NRT", 43, 3, true).await.unwrap();

        f.clock.advance(10 * DAY_MS);
        f.source.offline.store(true, Ordering::SeqCst);

        let read = f.cache.get_chapter_or_stale("NRT", 43, 3).await.unwrap();
        assert!(read.stale);
        assert_eq!(read.verses, original);
    }

    #[tokio::test]
    async fn test_stale_copy_survives_repeated_offline_reads() {
        let f = fixture();
        let original = f.cache.get_chapter("NRT", 43, 3, true).await.unwrap();

        f.clock.advance(10 * DAY_MS);
        f.source.offline.store(true, Ordering::SeqCst);

        for _ in 0..2 {
            let read = f.cache.get_chapter_or_stale("NRT", 43, 3).await.unwrap();
            assert!(read.stale);
            assert_eq!(read.verses, original);
        }
        assert!(f.storage.get("bible-chapter-NRT-43-3").unwrap().is_some());

        // Back online, the refetch replaces the expired copy.
        f.source.offline.store(false, Ordering::SeqCst);
        let read = f.cache.get_chapter_or_stale("NRT", 43, 3).await.unwrap();
        assert!(!read.stale);
        assert_ne!(read.verses, original);
        assert_eq!(f.cache.cached(&ChapterKey::new("NRT", 43, 3)), Some(read.verses));
    }

    #[tokio::test]
    async fn test_expired_copy_dropped_when_refetch_is_empty() {
        let f = fixture();
        f.cache.get_chapter("NRT", 43, 3, true).await.unwrap();

        f.clock.advance(10 * DAY_MS);
        f.source.empty.store(true, Ordering::SeqCst);

        let read = f.cache.get_chapter_or_stale("NRT", 43, 3).await.unwrap();
        assert!(read.verses.is_empty());
        assert!(!read.stale);
        assert_eq!(f.storage.get("bible-chapter-NRT-43-3").unwrap(), None);
    }

    #[tokio::test]
    async fn test_stale_fallback_without_copy_fails() {
        let f = fixture();
        f.source.offline.store(true, Ordering::SeqCst);

        assert!(f.cache.get_chapter_or_stale("NRT", 43, 3).await.is_err());
    }

    #[tokio::test]
    async fn test_fresh_copy_is_not_stale() {
        let f = fixture();
        f.cache.get_chapter("NRT", 43, 3, true).await.unwrap();
        f.source.offline.store(true, Ordering::SeqCst);

        let read = f.cache.get_chapter_or_stale("NRT", 43, 3).await.unwrap();
        assert!(!read.stale);
        assert_eq!(f.source.calls(), 1);
    }

    // --- Maintenance ---

    #[tokio::test]
    async fn test_clear_expired_removes_old_and_corrupt_entries() {
        let f = fixture();
        f.cache.get_chapter("NRT", 1, 1, true).await.unwrap();
        f.clock.advance(8 * DAY_MS);
        f.cache.get_chapter("NRT", 1, 2, true).await.unwrap();
        f.storage.set("bible-chapter-NRT-1-3", "garbage").unwrap();
        f.storage.set(TRANSLATION_KEY, "NIV").unwrap();

        assert_eq!(f.cache.clear_expired(), 2);

        let mut keys = f.storage.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["bible-chapter-NRT-1-2".to_string(), TRANSLATION_KEY.to_string()]);
    }

    #[tokio::test]
    async fn test_clear_all_keeps_other_namespaces() {
        let f = fixture();
        f.cache.get_chapter("NRT", 1, 1, true).await.unwrap();
        f.cache.get_chapter("NIV", 1, 1, true).await.unwrap();
        f.storage.set(TRANSLATION_KEY, "NIV").unwrap();

        assert_eq!(f.cache.clear_all(), 2);
        assert_eq!(f.storage.keys().unwrap(), vec![TRANSLATION_KEY.to_string()]);
    }

    #[tokio::test]
    async fn test_stats_report_counts_sizes_and_extremes() {
        let f = fixture();
        f.cache.get_chapter("NRT", 1, 1, true).await.unwrap();
        f.clock.advance(1000);
        f.cache.get_chapter("NRT", 1, 2, true).await.unwrap();
        f.clock.advance(1000);
        f.cache.get_chapter("UBIO", 1, 1, true).await.unwrap();

        let stats = f.cache.get_stats();
        assert_eq!(stats.chapter_count, 3);
        assert_eq!(stats.translation_stats.get("NRT"), Some(&2));
        assert_eq!(stats.translation_stats.get("UBIO"), Some(&1));
        assert!(stats.total_bytes > 0);
        assert_eq!(stats.total_size, format_bytes(stats.total_bytes));

        let oldest = stats.oldest_entry.unwrap();
        assert_eq!(oldest.key, "bible-chapter-NRT-1-1");
        assert_eq!(oldest.timestamp, T0);
        let newest = stats.newest_entry.unwrap();
        assert_eq!(newest.key, "bible-chapter-UBIO-1-1");
        assert_eq!(newest.timestamp, T0 + 2000);
    }

    #[tokio::test]
    async fn test_diagnostics_degrade_on_storage_failure() {
        let source = Arc::new(CountingSource::default());
        let cache = ChapterCache::new(Arc::new(BrokenStorage), source.clone());

        let stats = cache.get_stats();
        assert_eq!(stats.chapter_count, 0);
        assert_eq!(stats.total_size, "0 B");
        assert!(stats.oldest_entry.is_none());
        assert_eq!(cache.clear_all(), 0);
        assert_eq!(cache.clear_expired(), 0);

        // Reads still reach the source when storage is unusable.
        assert_eq!(cache.get_chapter("NRT", 1, 1, true).await.unwrap().len(), 1);
        assert_eq!(source.calls(), 1);
    }

    // --- File storage ---

    #[test]
    fn test_file_storage_round_trip_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        storage.set("bible-chapter-NRT-43-3", "{}").unwrap();
        storage.set("weird/key name", "x").unwrap();
        storage.set(".dotted", "d").unwrap();
        storage.set("bible-chapter-NRT-43-3", "{\"v\":2}").unwrap();

        assert_eq!(
            storage.get("bible-chapter-NRT-43-3").unwrap().as_deref(),
            Some("{\"v\":2}")
        );
        assert_eq!(storage.get("weird/key name").unwrap().as_deref(), Some("x"));
        assert_eq!(storage.get("missing").unwrap(), None);

        let mut keys = storage.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec![".dotted", "bible-chapter-NRT-43-3", "weird/key name"]);
        assert_eq!(storage.get(".dotted").unwrap().as_deref(), Some("d"));
        assert!(dir.path().join("weird%2Fkey%20name").exists());

        storage.remove("weird/key name").unwrap();
        storage.remove("weird/key name").unwrap();
        storage.remove(".dotted").unwrap();
        assert_eq!(storage.keys().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_file_backed_cache_persists_entries() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(CountingSource::default());
        {
            let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
            let cache = ChapterCache::new(storage, source.clone());
            cache.get_chapter("NRT", 43, 3, true).await.unwrap();
        }

        let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
        let raw = storage.get("bible-chapter-NRT-43-3").unwrap().unwrap();
        let entry: CachedChapter = serde_json::from_str(&raw).unwrap();
        assert_eq!(entry.data[0].book, 43);

        let cache = ChapterCache::new(storage, source.clone());
        cache.get_chapter("NRT", 43, 3, true).await.unwrap();
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_bolls_chapter_url() {
        let client = BollsClient::new("https://bolls.life/");
        assert_eq!(
            client.chapter_url("NRT", 43, 3),
            "https://bolls.life/get-text/NRT/43/3/"
        );
    }

    // --- Translation preference ---

    #[test]
    fn test_translation_defaults_and_saved_preference() {
        let storage = Arc::new(MemoryStorage::new());
        let settings = TranslationSettings::new(storage.clone());

        assert_eq!(settings.current(None).code, DEFAULT_TRANSLATION);

        storage.set(TRANSLATION_KEY, "NIV").unwrap();
        assert_eq!(settings.current(None).code, "NIV");

        storage.set(TRANSLATION_KEY, "KJV").unwrap();
        assert_eq!(settings.current(None).code, DEFAULT_TRANSLATION);
    }

    #[test]
    fn test_url_override_wins_and_is_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TRANSLATION_KEY, "NIV").unwrap();
        let settings = TranslationSettings::new(storage.clone());

        assert_eq!(settings.current(Some("ubio")).code, "UBIO");
        assert_eq!(storage.get(TRANSLATION_KEY).unwrap().as_deref(), Some("UBIO"));

        assert_eq!(settings.current(Some("KJV")).code, "UBIO");
        assert!(find_translation("kjv").is_none());
    }

    #[tokio::test]
    async fn test_switching_translation_flushes_chapters() {
        let f = fixture();
        let settings = TranslationSettings::new(f.storage.clone());
        f.cache.get_chapter("NRT", 1, 1, true).await.unwrap();

        assert_eq!(settings.switch("NRT", &f.cache).unwrap().code, "NRT");
        assert_eq!(f.cache.get_stats().chapter_count, 1);

        assert_eq!(settings.switch("NIV", &f.cache).unwrap().code, "NIV");
        assert_eq!(f.cache.get_stats().chapter_count, 0);
        assert_eq!(settings.current(None).code, "NIV");

        assert!(settings.switch("KJV", &f.cache).is_none());
        assert_eq!(settings.current(None).code, "NIV");
    }
}
