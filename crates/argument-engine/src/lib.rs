//! # Argument Engine
//!
//! The facade that wires Domain Memory, the Evidence Normalizer, the
//! Extension Solver, and the Resolver into the single `resolve()` call
//! external collaborators use. It constructs a typed argumentation
//! framework out of policy, pattern, and memory evidence, computes its
//! extensions, derives a verdict and risk score, and persists the outcome.

pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;

pub use collaborators::{PatternDetector, PolicyEvaluator};
pub use config::{ConfigError, EngineConfig};
pub use engine::ArgumentEngine;
pub use error::EngineError;

pub use domain_memory::{DomainReputation, KnowledgeEntry, MemoryStats, Outcome, ReputationLabel};
pub use evidence_normalizer::{Evidence, PatternCounters, PolicyVerdict, Substitution};
pub use extension_solver::{
    Argument, ArgumentId, ArgumentKind, ArgumentSource, ArgumentationFramework, Extension, ExtensionKind,
};
pub use resolver::{
    canonical_json, compute_fingerprint, stable_hash, ExplanationEntry, ExtensionsByKind, Fingerprint,
    ResolutionResult, Verdict,
};
