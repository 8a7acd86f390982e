//! # HTTP Boundary
//!
//! Axum router exposing search and word definitions, with CORS, request
//! logging and a uniform `{error, message}` envelope for every failure.

pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod tests;
