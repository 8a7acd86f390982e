//! Deterministic provider for tests.

use super::{GenerationProvider, ProviderError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub(crate) fn lexical_payload(word: &str) -> String {
    serde_json::json!({
        "greek_hebrew": {
            "word": "λόγος",
            "transliteration": "logos",
            "strongs_number": "G3056",
            "root": "λέγω",
            "literal_meaning": word,
        },
        "explanations": {
            "basic": format!("{word}: основное значение"),
            "intermediate": format!("{word}: значение в контексте"),
        }
    })
    .to_string()
}

/// Replays scripted results in order, then keeps answering with `fallback`.
pub(crate) struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback: String,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub(crate) fn always(payload: impl Into<String>) -> Self {
        Self::with_script(Vec::new(), payload)
    }

    pub(crate) fn with_script(
        script: Vec<Result<String, ProviderError>>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: fallback.into(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}
