//! Normalization of raw provider output.
//!
//! Providers are asked for bare JSON but sometimes wrap it in a markdown code
//! fence. Fence stripping is a separate step from parsing so each can be
//! exercised on its own.

use crate::definition::types::{Explanations, OriginalWord, ParsedDefinition};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderPayload {
    Parsed(ParsedDefinition),
    Malformed(String),
}

/// Removes a surrounding ```` ```json ```` / ```` ``` ```` fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawExplanations {
    basic: Option<String>,
    intermediate: Option<String>,
}

/// Accepts both the current lexical shape and the legacy theological shape
/// (`basic_meaning` / `context_meaning`); other legacy fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPayload {
    greek_hebrew: Option<OriginalWord>,
    explanations: Option<RawExplanations>,
    basic_meaning: Option<String>,
    context_meaning: Option<String>,
}

pub fn parse_payload(raw: &str) -> ProviderPayload {
    let body = strip_code_fence(raw);

    let payload: RawPayload = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Provider payload is not valid JSON: {}", e);
            return ProviderPayload::Malformed(raw.to_string());
        }
    };

    let explanations = payload.explanations.unwrap_or_default();
    let basic = explanations.basic.or(payload.basic_meaning);
    let intermediate = explanations.intermediate.or(payload.context_meaning);

    if payload.greek_hebrew.is_none() && basic.is_none() && intermediate.is_none() {
        return ProviderPayload::Malformed(raw.to_string());
    }

    ProviderPayload::Parsed(ParsedDefinition {
        greek_hebrew: payload.greek_hebrew.unwrap_or_default(),
        explanations: Explanations {
            basic: basic.unwrap_or_default(),
            intermediate: intermediate.unwrap_or_default(),
        },
    })
}
