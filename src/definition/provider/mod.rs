//! Generation providers.
//!
//! A provider turns a prompt into raw text. Everything around the call
//! (prompt construction, the hard timeout, retry on overload, payload
//! normalization) lives here and is shared by both backends.

pub mod gemini;
pub mod openrouter;
pub mod payload;

#[cfg(test)]
pub(crate) mod scripted;

use crate::definition::types::ParsedDefinition;
use async_trait::async_trait;
use payload::{ProviderPayload, parse_payload};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider overloaded (HTTP {status})")]
    Overloaded { status: u16 },
    #[error("provider timed out after {0:?}")]
    Timeout(Duration),
    #[error("provider returned HTTP {status}")]
    Status { status: u16 },
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("provider returned a malformed payload")]
    Malformed(String),
    #[error("retry attempts exhausted")]
    Exhausted,
}

impl ProviderError {
    pub fn from_status(status: u16) -> Self {
        match status {
            429 | 503 => ProviderError::Overloaded { status },
            _ => ProviderError::Status { status },
        }
    }

    /// Only overload is transient; a timeout is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Overloaded { .. })
    }
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Sends the prompt and returns the model's text content.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Backend selection plus its credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    OpenRouter {
        api_key: String,
        api_url: String,
        model: String,
    },
    Gemini {
        api_key: String,
        api_url: String,
    },
}

pub fn build_provider(config: &ProviderConfig) -> Arc<dyn GenerationProvider> {
    match config {
        ProviderConfig::OpenRouter {
            api_key,
            api_url,
            model,
        } => Arc::new(openrouter::OpenRouterProvider::new(api_url, api_key, model)),
        ProviderConfig::Gemini { api_key, api_url } => {
            Arc::new(gemini::GeminiProvider::new(api_url, api_key))
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(20),
        }
    }
}

pub fn build_prompt(word: &str, context: &str) -> String {
    format!(
        r#"Найди лемму для "{word}" в стихе: "{context}"

Язык оригинала:
• ВЗ - древнееврейский
• Ездра 4:8–6:18; 7:12–26; Дан 2:4b–7:28; Иер 10:11 - арамейский
• НЗ - древнегреческий (койне)

Ответь JSON (без markdown):
{{
  "greek_hebrew": {{
    "word": "<оригинал>",
    "transliteration": "<транслит>",
    "strongs_number": "<H/G номер>",
    "root": "<корень>",
    "literal_meaning": "<значение>"
  }},
  "explanations": {{
    "basic": "<1-2 предложения>",
    "intermediate": "<3-4 предложения с контекстом>"
  }}
}}

ВСЁ НА РУССКОМ."#
    )
}

/// Runs one generation with the hard timeout and overload retries applied.
pub async fn generate_definition(
    provider: &dyn GenerationProvider,
    policy: &RetryPolicy,
    word: &str,
    context: &str,
) -> Result<ParsedDefinition, ProviderError> {
    let prompt = build_prompt(word, context);
    let mut delay = policy.base_delay;

    for attempt in 1..=policy.max_attempts {
        let attempt_result = tokio::time::timeout(policy.timeout, provider.complete(&prompt)).await;
        let outcome = match attempt_result {
            Ok(outcome) => outcome,
            Err(_) => Err(ProviderError::Timeout(policy.timeout)),
        };

        match outcome {
            Ok(raw) => {
                return match parse_payload(&raw) {
                    ProviderPayload::Parsed(definition) => Ok(definition),
                    ProviderPayload::Malformed(raw) => {
                        tracing::error!(
                            "{} returned malformed payload for {:?}: {:.200}",
                            provider.name(),
                            word,
                            raw
                        );
                        Err(ProviderError::Malformed(raw))
                    }
                };
            }
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                let jitter_ms = rand::random::<u64>() % (delay.as_millis() as u64 / 10 + 1);
                let wait = delay + Duration::from_millis(jitter_ms);
                tracing::warn!(
                    "{} overloaded ({}/{}), retry in {:?}",
                    provider.name(),
                    attempt,
                    policy.max_attempts,
                    wait
                );
                tokio::time::sleep(wait).await;
                delay *= 2;
            }
            Err(e) => {
                tracing::error!("{} failed for {:?}: {}", provider.name(), word, e);
                return Err(e);
            }
        }
    }

    Err(ProviderError::Exhausted)
}
