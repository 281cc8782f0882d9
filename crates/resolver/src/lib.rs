//! # Resolver
//!
//! Selects the authoritative extension from a solver's output, derives the
//! final verdict and risk score, and assembles a defeated map and
//! explanation tree auditors can replay without re-running the solver.

pub mod determinism;
pub mod error;
pub mod resolver;
pub mod types;

pub use determinism::{canonical_json, compute_fingerprint, stable_hash, Fingerprint};
pub use error::ResolverError;
pub use resolver::resolve;
pub use types::{ExplanationEntry, ExtensionsByKind, ResolutionResult, Verdict};
