//! Reader translation preference.

use super::cache::ChapterCache;
use super::storage::LocalStorage;
use serde::Serialize;
use std::sync::Arc;

pub const TRANSLATION_KEY: &str = "bible-translation";
pub const DEFAULT_TRANSLATION: &str = "NRT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub code: &'static str,
    pub name: &'static str,
    pub lang: &'static str,
}

pub static SUPPORTED_TRANSLATIONS: [Translation; 3] = [
    Translation {
        code: "UBIO",
        name: "Українська (UBIO)",
        lang: "uk",
    },
    Translation {
        code: "NRT",
        name: "Новый русский перевод (NRT)",
        lang: "ru",
    },
    Translation {
        code: "NIV",
        name: "NIV (English)",
        lang: "en",
    },
];

pub fn find_translation(code: &str) -> Option<&'static Translation> {
    SUPPORTED_TRANSLATIONS
        .iter()
        .find(|t| t.code.eq_ignore_ascii_case(code.trim()))
}

pub struct TranslationSettings {
    storage: Arc<dyn LocalStorage>,
}

impl TranslationSettings {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    fn persist(&self, code: &str) {
        if let Err(e) = self.storage.set(TRANSLATION_KEY, code) {
            tracing::warn!("Failed to save translation preference: {}", e);
        }
    }

    /// Active translation: a supported URL override (which is also saved),
    /// then the saved preference, then the default.
    pub fn current(&self, url_param: Option<&str>) -> &'static Translation {
        if let Some(param) = url_param
            && let Some(translation) = find_translation(param)
        {
            self.persist(translation.code);
            return translation;
        }

        let saved = match self.storage.get(TRANSLATION_KEY) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("Failed to read translation preference: {}", e);
                None
            }
        };

        saved
            .as_deref()
            .and_then(find_translation)
            .or_else(|| find_translation(DEFAULT_TRANSLATION))
            .unwrap_or(&SUPPORTED_TRANSLATIONS[1])
    }

    /// Saves `code` as the preference. Cached chapters belong to the old
    /// translation, so a real switch flushes them. Returns `None` for an
    /// unsupported code.
    pub fn switch(&self, code: &str, cache: &ChapterCache) -> Option<&'static Translation> {
        let translation = find_translation(code)?;
        let previous = self.current(None);

        self.persist(translation.code);
        if previous.code != translation.code {
            let flushed = cache.clear_all();
            tracing::info!(
                "Switched translation {} -> {}, flushed {} chapters",
                previous.code,
                translation.code,
                flushed
            );
        }
        Some(translation)
    }
}
