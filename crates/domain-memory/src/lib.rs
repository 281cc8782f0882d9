//! # Domain Memory
//!
//! Append-only log of per-domain decision observations, with a
//! recency-weighted reputation query used by the Evidence Normalizer.
//!
//! Entries are never mutated once stored. Reputation is derived on demand
//! from entries newer than an effective horizon; it is not itself
//! persisted.

pub mod error;
pub mod store;
pub mod types;

pub use error::MemoryError;
pub use store::{MemoryStore, DEFAULT_HALFLIFE_SECONDS};
pub use types::{DomainReputation, KnowledgeEntry, MemoryStats, Outcome, ReputationLabel};
