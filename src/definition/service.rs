use super::error::DefinitionError;
use super::memory::RecencyCache;
use super::provider::{GenerationProvider, RetryPolicy, build_provider, generate_definition};
use super::sanitize::{ValidatedLookup, validate_lookup};
use super::store::{DefinitionStore, open_store};
use super::types::{DefinitionStats, WordDefinition};
use crate::config::DefinitionConfig;
use anyhow::Context;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::OnceCell;

type Flight = Arc<OnceCell<Result<WordDefinition, DefinitionError>>>;

#[derive(Default)]
struct Counters {
    memory_hits: AtomicU64,
    store_hits: AtomicU64,
    generations: AtomicU64,
    coalesced: AtomicU64,
    persist_races: AtomicU64,
    failures: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Resolves word definitions through memory, the durable store and, on a
/// miss in both, a single coalesced provider generation per key.
pub struct DefinitionService {
    provider: Arc<dyn GenerationProvider>,
    store: Arc<dyn DefinitionStore>,
    memory: RecencyCache<WordDefinition>,
    in_flight: DashMap<String, Flight>,
    policy: RetryPolicy,
    counters: Counters,
}

impl DefinitionService {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        store: Arc<dyn DefinitionStore>,
        memory_capacity: usize,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            store,
            memory: RecencyCache::new(memory_capacity),
            in_flight: DashMap::new(),
            policy,
            counters: Counters::default(),
        }
    }

    pub async fn init(config: &DefinitionConfig) -> anyhow::Result<Arc<Self>> {
        let store = open_store(&config.store)
            .await
            .context("failed to open definition store")?;
        let provider = build_provider(&config.provider);

        match store.count().await {
            Ok(n) => tracing::info!("Definition store holds {} records", n),
            Err(e) => tracing::warn!("Could not count stored definitions: {}", e),
        }
        tracing::info!(
            "Definition service ready: provider={}, memory capacity={}, timeout={:?}",
            provider.name(),
            config.memory_capacity,
            config.retry.timeout
        );

        Ok(Arc::new(Self::new(
            provider,
            store,
            config.memory_capacity,
            config.retry.clone(),
        )))
    }

    pub async fn get_definition(
        &self,
        word: &str,
        verse_ref: &str,
        context: &str,
    ) -> Result<WordDefinition, DefinitionError> {
        let lookup = validate_lookup(word, verse_ref, context)?;
        let key = lookup.cache_key();

        if let Some(definition) = self.memory.get(&key) {
            bump(&self.counters.memory_hits);
            tracing::debug!("Memory hit for {:?} @ {}", lookup.word, lookup.verse_ref);
            return Ok(definition);
        }

        if let Some(definition) = self.find_stored(&key).await? {
            tracing::debug!("Store hit for {:?} @ {}", lookup.word, lookup.verse_ref);
            return Ok(definition);
        }

        let flight = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                bump(&self.counters.coalesced);
                tracing::debug!("Joining in-flight generation for {:?}", lookup.word);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let flight: Flight = Arc::new(OnceCell::new());
                entry.insert(flight.clone());
                flight
            }
        };

        let outcome = flight
            .get_or_init(|| self.resolve(&lookup, &key))
            .await
            .clone();

        // Drop the registry slot so a failed flight is retried by the next caller.
        self.in_flight
            .remove_if(&key, |_, current| Arc::ptr_eq(current, &flight));

        outcome
    }

    async fn find_stored(&self, key: &str) -> Result<Option<WordDefinition>, DefinitionError> {
        let found = self.store.find(key).await.map_err(|e| {
            bump(&self.counters.failures);
            tracing::error!("Definition store lookup failed: {}", e);
            DefinitionError::from(e)
        })?;

        if let Some(definition) = &found {
            bump(&self.counters.store_hits);
            self.memory.insert(key.to_string(), definition.clone());
        }
        Ok(found)
    }

    async fn resolve(
        &self,
        lookup: &ValidatedLookup,
        key: &str,
    ) -> Result<WordDefinition, DefinitionError> {
        // A previous flight for this key may have finished since our misses.
        if let Some(definition) = self.memory.get(key) {
            bump(&self.counters.memory_hits);
            return Ok(definition);
        }
        if let Some(definition) = self.find_stored(key).await? {
            return Ok(definition);
        }

        bump(&self.counters.generations);
        tracing::info!(
            "Generating definition for {:?} @ {}",
            lookup.word,
            lookup.verse_ref
        );

        let context = if lookup.context.is_empty() {
            lookup.verse_ref.as_str()
        } else {
            lookup.context.as_str()
        };
        let parsed = generate_definition(
            self.provider.as_ref(),
            &self.policy,
            &lookup.word,
            context,
        )
        .await
        .map_err(|e| {
            bump(&self.counters.failures);
            DefinitionError::from(e)
        })?;

        let candidate = WordDefinition::generated(&lookup.word, &lookup.verse_ref, parsed);
        let canonical = self
            .store
            .insert_if_absent(key, candidate.clone())
            .await
            .map_err(|e| {
                bump(&self.counters.failures);
                tracing::error!("Failed to persist definition for {:?}: {}", lookup.word, e);
                DefinitionError::from(e)
            })?;

        if canonical != candidate {
            bump(&self.counters.persist_races);
            tracing::info!(
                "Another writer persisted {:?} @ {} first, using stored record",
                lookup.word,
                lookup.verse_ref
            );
        } else {
            tracing::debug!(
                "Persisted definition for {:?} @ {}",
                lookup.word,
                lookup.verse_ref
            );
        }

        self.memory.insert(key.to_string(), canonical.clone());
        Ok(canonical)
    }

    pub fn stats(&self) -> DefinitionStats {
        let read = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        DefinitionStats {
            memory_hits: read(&self.counters.memory_hits),
            store_hits: read(&self.counters.store_hits),
            generations: read(&self.counters.generations),
            coalesced: read(&self.counters.coalesced),
            persist_races: read(&self.counters.persist_races),
            failures: read(&self.counters.failures),
            memory_entries: self.memory.len(),
        }
    }

    pub fn close(&self) {
        let stats = self.stats();
        tracing::info!(
            "Definition service closing: memory_hits={} store_hits={} generations={} \
             coalesced={} races={} failures={}",
            stats.memory_hits,
            stats.store_hits,
            stats.generations,
            stats.coalesced,
            stats.persist_races,
            stats.failures
        );
        self.memory.clear();
    }
}
