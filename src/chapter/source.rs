//! Remote chapter source.

use crate::search::types::Verse;
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_BOLLS_URL: &str = "https://bolls.life";

#[derive(Debug, thiserror::Error)]
pub enum ChapterError {
    #[error("chapter request failed: {0}")]
    Transport(String),
    #[error("chapter API returned HTTP {status}")]
    Status { status: u16 },
    #[error("chapter API returned an unexpected body: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ChapterSource: Send + Sync {
    async fn fetch_chapter(
        &self,
        translation: &str,
        book: u32,
        chapter: u32,
    ) -> Result<Vec<Verse>, ChapterError>;
}

/// A verse as served by bolls.life. Book and chapter are implied by the URL
/// and often missing from the body.
#[derive(Deserialize)]
struct BollsVerse {
    #[serde(default)]
    book: Option<u32>,
    #[serde(default)]
    chapter: Option<u32>,
    verse: u32,
    text: String,
    #[serde(default)]
    comment: Option<String>,
}

pub struct BollsClient {
    http: reqwest::Client,
    base_url: String,
}

impl BollsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn chapter_url(&self, translation: &str, book: u32, chapter: u32) -> String {
        format!(
            "{}/get-text/{}/{}/{}/",
            self.base_url, translation, book, chapter
        )
    }
}

#[async_trait]
impl ChapterSource for BollsClient {
    async fn fetch_chapter(
        &self,
        translation: &str,
        book: u32,
        chapter: u32,
    ) -> Result<Vec<Verse>, ChapterError> {
        let url = self.chapter_url(translation, book, chapter);
        tracing::debug!("Fetching {}", url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ChapterError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ChapterError::Status {
                status: status.as_u16(),
            });
        }

        let verses: Vec<BollsVerse> = resp
            .json()
            .await
            .map_err(|e| ChapterError::Decode(e.to_string()))?;

        Ok(verses
            .into_iter()
            .map(|v| Verse {
                book: v.book.unwrap_or(book),
                chapter: v.chapter.unwrap_or(chapter),
                verse: v.verse,
                text: v.text,
                comment: v.comment.filter(|c| !c.is_empty()),
            })
            .collect())
    }
}
