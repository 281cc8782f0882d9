//! Trait contracts for the external systems this crate depends on but does
//! not implement: the sensitive-pattern detector and the policy evaluator.
//! Production binaries supply real implementations; tests supply fakes.

use evidence_normalizer::{PatternCounters, PolicyVerdict};

/// Scans arbitrary text for sensitive patterns. Never fails for in-memory
/// input — a detector that cannot run returns all-zero counters.
pub trait PatternDetector {
    fn scan(&self, text: &str) -> PatternCounters;
}

/// Consults an external policy engine for a domain/pack/counters triple.
/// Returning `Err` is treated by the normalizer as an empty verdict and a
/// `PolicyUnavailable` substitution (§7).
pub trait PolicyEvaluator {
    type Error: std::error::Error + Send + Sync + 'static;

    fn evaluate(
        &self,
        domain: &str,
        policy_pack: &str,
        counters: &PatternCounters,
    ) -> Result<PolicyVerdict, Self::Error>;
}
