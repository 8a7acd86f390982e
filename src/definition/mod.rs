//! # Definition Cache Pipeline
//!
//! Contextual word definitions backed by three tiers:
//!
//! 1. **Memory**: a bounded LRU (`memory::RecencyCache`) in front of everything.
//! 2. **Store**: the durable `DefinitionStore`, source of truth. Records are
//!    immutable; the first one written for a `(word, verse_ref)` key wins.
//! 3. **Provider**: a `GenerationProvider` called only on a miss in both
//!    tiers, behind a hard timeout, with retries on overload.
//!
//! Concurrent misses on the same key share one generation (`service`). Inputs
//! are validated and stripped before any tier is touched (`sanitize`).

pub mod error;
pub mod handlers;
pub mod memory;
pub mod provider;
pub mod sanitize;
pub mod service;
pub mod store;
pub mod types;
