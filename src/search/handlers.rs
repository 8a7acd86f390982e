use super::corpus::Corpus;
use super::engine::search;
use super::types::{FrequencyParams, SearchParams, SearchResponse, Verse, WordFrequency};
use crate::reference::books::book_name;
use crate::server::error::ApiError;
use axum::extract::{Path, Query};
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn handle_search(
    Query(params): Query<SearchParams>,
    Extension(corpus): Extension<Arc<Corpus>>,
) -> Json<SearchResponse> {
    Json(search(&corpus, &params.q))
}

pub async fn handle_chapter(
    Path((book, chapter)): Path<(u32, u32)>,
    Extension(corpus): Extension<Arc<Corpus>>,
) -> Result<Json<Vec<Verse>>, ApiError> {
    if book_name(book).is_none() {
        return Err(ApiError::not_found(format!("Unknown book {}", book)));
    }

    let verses = corpus.chapter(book, chapter);
    if verses.is_empty() {
        tracing::debug!("Chapter {}:{} not found in corpus", book, chapter);
        return Err(ApiError::not_found(format!(
            "Chapter {} of book {} not found",
            chapter, book
        )));
    }

    Ok(Json(verses))
}

pub async fn handle_frequency(
    Query(params): Query<FrequencyParams>,
    Extension(corpus): Extension<Arc<Corpus>>,
) -> Result<Json<WordFrequency>, ApiError> {
    if params.word.trim().is_empty() {
        return Err(ApiError::bad_request("Missing required parameter: word"));
    }

    Ok(Json(corpus.word_frequency(&params.word)))
}
