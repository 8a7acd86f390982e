//! Reference Parser Module
//!
//! Turns free-text queries such as `ин 3:16` or `Бытие 1` into a structured
//! [`parser::Reference`] (book, optional chapter, optional verse).
//!
//! ## Submodules
//! - **`books`**: The canonical 66-book table, alias table, testaments and sections.
//! - **`parser`**: Pattern matching of `<book tokens> [chapter][:verse]` queries.

pub mod books;
pub mod parser;
