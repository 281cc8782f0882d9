//! Input evidence shapes consumed by the normalizer.

use serde::{Deserialize, Serialize};

/// The structured result of the external policy evaluator.
///
/// On `PolicyUnavailable`, callers pass `None` instead of fabricating one
/// of these; the normalizer substitutes a Suspicion argument (§4.2/§7).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    #[serde(default)]
    pub decision: String,
    #[serde(default)]
    pub deny_reasons: Vec<String>,
    #[serde(default)]
    pub modification_list: Vec<String>,
    #[serde(default)]
    pub matched_rules: Vec<String>,
    #[serde(default)]
    pub risk_score_hint: i32,
}

/// Non-negative counts of sensitive patterns detected in the content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCounters {
    #[serde(default)]
    pub ssn: u32,
    #[serde(default)]
    pub credit_card: u32,
    #[serde(default)]
    pub email: u32,
    #[serde(default)]
    pub phone: u32,
    #[serde(default)]
    pub ip_address: u32,
}

impl PatternCounters {
    #[must_use]
    pub fn has_critical_pii(&self) -> bool {
        self.ssn > 0 || self.credit_card > 0
    }
}

/// All evidence the normalizer needs for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub domain: String,
    /// Opaque tag that influences strengths but never graph structure.
    pub policy_pack: String,
    #[serde(default)]
    pub policy_verdict: Option<PolicyVerdict>,
    #[serde(default)]
    pub pattern_counters: PatternCounters,
    /// The clock reading normalization runs against, for reputation
    /// queries. Monotonic seconds, same clock domain as the memory store.
    pub now: u64,
}

/// A record of a substitution the normalizer made in place of a failed or
/// absent collaborator call, carried into the final explanation for
/// auditability (§7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substitution {
    pub reason: String,
    pub inserted_argument_id: String,
}
