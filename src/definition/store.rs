//! Durable definition stores.
//!
//! The store is the source of truth for generated definitions. Writes are
//! first-writer-wins: `insert_if_absent` never replaces an existing record and
//! always hands back the canonical one.

use super::types::WordDefinition;
use async_trait::async_trait;
use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt record for key {key:?}: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
    #[error("failed to encode record: {0}")]
    Encode(serde_json::Error),
}

#[async_trait]
pub trait DefinitionStore: Send + Sync {
    async fn find(&self, key: &str) -> Result<Option<WordDefinition>, StoreError>;

    /// Writes `definition` unless a record for `key` exists; returns whichever
    /// record is canonical after the call.
    async fn insert_if_absent(
        &self,
        key: &str,
        definition: WordDefinition,
    ) -> Result<WordDefinition, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// Where the durable store lives, parsed from `DEFINITION_STORE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    Directory(PathBuf),
}

impl FromStr for StoreLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "memory:" || s == "memory://" {
            return Ok(StoreLocation::Memory);
        }
        let path = s
            .strip_prefix("file://")
            .or_else(|| s.strip_prefix("file:"))
            .ok_or_else(|| {
                format!(
                    "unsupported store url {:?} (expected memory: or file:<dir>)",
                    s
                )
            })?;
        if path.is_empty() {
            return Err("file: store url needs a directory".to_string());
        }
        Ok(StoreLocation::Directory(PathBuf::from(path)))
    }
}

pub async fn open_store(location: &StoreLocation) -> Result<Arc<dyn DefinitionStore>, StoreError> {
    match location {
        StoreLocation::Memory => {
            tracing::warn!("Using in-memory definition store; definitions are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreLocation::Directory(dir) => Ok(Arc::new(FileStore::open(dir).await?)),
    }
}

// --- In-memory store ---

#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, WordDefinition>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DefinitionStore for MemoryStore {
    async fn find(&self, key: &str) -> Result<Option<WordDefinition>, StoreError> {
        Ok(self.records.get(key).map(|r| r.value().clone()))
    }

    async fn insert_if_absent(
        &self,
        key: &str,
        definition: WordDefinition,
    ) -> Result<WordDefinition, StoreError> {
        let canonical = self
            .records
            .entry(key.to_string())
            .or_insert(definition)
            .value()
            .clone();
        Ok(canonical)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.len())
    }
}

// --- File store ---

/// One JSON document per key, named by the BLAKE3 hash of the key.
///
/// Records are written to a temporary file and hard-linked into place; the
/// link fails if the target exists, which makes the first writer canonical
/// across tasks and processes sharing the directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn open(dir: &Path) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(dir).await?;
        tracing::info!("Definition store at {}", dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        let digest = blake3::hash(key.as_bytes());
        self.dir.join(format!("{}.json", digest.to_hex()))
    }

    async fn read_record(
        &self,
        key: &str,
        path: &Path,
    ) -> Result<Option<WordDefinition>, StoreError> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(record))
    }
}

#[async_trait]
impl DefinitionStore for FileStore {
    async fn find(&self, key: &str) -> Result<Option<WordDefinition>, StoreError> {
        self.read_record(key, &self.record_path(key)).await
    }

    async fn insert_if_absent(
        &self,
        key: &str,
        definition: WordDefinition,
    ) -> Result<WordDefinition, StoreError> {
        let target = self.record_path(key);
        let encoded = serde_json::to_vec_pretty(&definition).map_err(StoreError::Encode)?;

        let staging = self.dir.join(format!(".staging-{}", uuid::Uuid::new_v4()));
        tokio::fs::write(&staging, &encoded).await?;
        let linked = tokio::fs::hard_link(&staging, &target).await;
        if let Err(e) = tokio::fs::remove_file(&staging).await {
            tracing::warn!("Failed to remove staging file {}: {}", staging.display(), e);
        }

        match linked {
            Ok(()) => Ok(definition),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!("Record for {:?} already persisted, keeping existing", key);
                self.read_record(key, &target)
                    .await?
                    .ok_or_else(|| StoreError::Io(std::io::Error::from(ErrorKind::NotFound)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut count = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                count += 1;
            }
        }
        Ok(count)
    }
}
