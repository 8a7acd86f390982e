use super::service::DefinitionService;
use super::types::{DefinitionStats, WordDefinition, WordRequest};
use crate::server::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use std::sync::Arc;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: word, verseRef";

pub async fn handle_word(
    Extension(service): Extension<Arc<DefinitionService>>,
    payload: Result<Json<WordRequest>, JsonRejection>,
) -> Result<Json<WordDefinition>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::warn!("Rejected /api/word body: {}", rejection.body_text());
        ApiError::bad_request("Request body must be a JSON object")
    })?;

    let (Some(word), Some(verse_ref)) = (
        req.word.filter(|w| !w.trim().is_empty()),
        req.verse_ref.filter(|r| !r.trim().is_empty()),
    ) else {
        return Err(ApiError::bad_request(MISSING_FIELDS_MESSAGE));
    };

    let context = req.verse_context.unwrap_or_default();
    let definition = service.get_definition(&word, &verse_ref, &context).await?;

    Ok(Json(definition))
}

pub async fn handle_stats(
    Extension(service): Extension<Arc<DefinitionService>>,
) -> Json<DefinitionStats> {
    Json(service.stats())
}
