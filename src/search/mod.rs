//! Search Service Module
//!
//! Answers user queries against the in-memory verse corpus.
//!
//! ## Overview
//! A query is first interpreted as a scripture reference (`ин 3:16`). When that
//! fails it runs as a full-text search: every whitespace-separated term must
//! occur in the verse (logical AND), and matched terms are wrapped in
//! `<mark>` tags on the original, case-preserved text.
//!
//! ## Submodules
//! - **`corpus`**: The loaded verse list plus chapter, book and frequency lookups.
//! - **`engine`**: Reference-or-text dispatch and result limits.
//! - **`handlers`**: HTTP request handlers for the Axum web server.
//! - **`highlight`**: Escaped, non-nesting highlight marker insertion.
//! - **`tokenizer`**: Query normalization and term splitting.
//! - **`types`**: Data Transfer Objects (DTOs) for API communication.

pub mod corpus;
pub mod engine;
pub mod handlers;
pub mod highlight;
pub mod tokenizer;
pub mod types;
