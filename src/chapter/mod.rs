//! # Chapter Cache Layer
//!
//! Client-side, time-boxed cache over chapters fetched from a remote Bible
//! API, keyed by `(translation, book, chapter)`.
//!
//! - **`types`**: Keys, stored entries and the stats report.
//! - **`storage`**: The `LocalStorage` abstraction with in-memory and directory backends.
//! - **`source`**: The `ChapterSource` trait and the bolls.life client.
//! - **`cache`**: TTL lookups, write-through, stale fallback and maintenance.
//! - **`translation`**: The persisted translation preference.

pub mod cache;
pub mod source;
pub mod storage;
pub mod translation;
pub mod types;

#[cfg(test)]
mod tests;
