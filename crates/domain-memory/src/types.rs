//! Core types for the domain memory subsystem.
//!
//! All types are designed for deterministic serialization: field order is
//! fixed by the struct declaration and map-valued fields use `BTreeMap` so
//! that two entries built from the same facts serialize to identical bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The outcome recorded for a single decision observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Allow,
    Deny,
    Modify,
}

/// A single append-only observation of a decision made for a domain.
///
/// Entries are never mutated once stored; corrections are recorded as new
/// entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub domain: String,
    pub outcome: Outcome,
    #[serde(default)]
    pub matched_rules: Vec<String>,
    /// Monotonic seconds within this process's clock.
    pub timestamp: u64,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

/// Classification label derived from a domain's recency-weighted reputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationLabel {
    Trusted,
    Suspicious,
    Mixed,
    Unknown,
}

/// A derived (never stored) recency-weighted summary of a domain's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainReputation {
    pub domain: String,
    pub score: f64,
    pub label: ReputationLabel,
    pub sample_count: usize,
    pub last_seen: Option<u64>,
}

/// Aggregate counters over the whole store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_entries: usize,
    pub distinct_domains: usize,
    pub oldest_timestamp: Option<u64>,
    pub newest_timestamp: Option<u64>,
}
