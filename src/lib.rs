//! Scripture Reader Library
//!
//! Core modules behind the HTTP server (`main.rs`) and the `reader` client
//! (`bin/reader.rs`).
//!
//! ## Modules
//! - **`config`**: Environment configuration, validated eagerly at start-up.
//! - **`reference`**: Canonical book table, aliases and the reference parser
//!   (`ин 3:16` → book 43, chapter 3, verse 16).
//! - **`search`**: The in-memory verse corpus with reference and full-text
//!   search plus highlighting.
//! - **`definition`**: AI word definitions behind a memory tier, a durable
//!   store and a single-flight generation step.
//! - **`chapter`**: Client-side, time-boxed cache over chapters fetched from
//!   a remote Bible API, and the translation preference.
//! - **`server`**: Axum routing, CORS and the error envelope.

pub mod chapter;
pub mod config;
pub mod definition;
pub mod reference;
pub mod search;
pub mod server;
