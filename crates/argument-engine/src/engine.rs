//! Wires Domain Memory, the Evidence Normalizer, the Extension Solver and
//! the Resolver into the single `resolve()` call collaborators see (§6).

use std::collections::BTreeMap;
use std::path::Path;

use domain_memory::{KnowledgeEntry, MemoryStore, Outcome};
use evidence_normalizer::{normalize, Evidence, NormalizerConfig};
use extension_solver::{solve, SolverConfig};
use resolver::{resolve as resolve_extensions, ResolutionResult, Verdict};

use crate::config::EngineConfig;
use crate::error::EngineError;

pub struct ArgumentEngine {
    memory: MemoryStore,
    normalizer_config: NormalizerConfig,
    solver_config: SolverConfig,
}

impl ArgumentEngine {
    /// Opens (or creates) the memory log at `memory_log_path` and builds an
    /// engine configured per `config`.
    pub fn open(memory_log_path: &Path, config: &EngineConfig) -> Result<Self, EngineError> {
        let memory = MemoryStore::open(memory_log_path, config.memory_halflife_seconds)?;
        Ok(Self {
            memory,
            normalizer_config: config.normalizer_config(),
            solver_config: config.solver_config(),
        })
    }

    /// Normalizes, solves, and resolves `evidence`, then records the
    /// resulting outcome in Domain Memory for future reputation queries.
    pub fn resolve(&self, evidence: &Evidence) -> Result<ResolutionResult, EngineError> {
        let normalized = normalize(evidence, &self.memory, &self.normalizer_config)?;
        let solver_output = solve(&normalized.framework, &self.solver_config)?;

        let risk_score_hint = evidence
            .policy_verdict
            .as_ref()
            .map_or(0.0, |v| f64::from(v.risk_score_hint));
        let result = resolve_extensions(&normalized.framework, &solver_output, risk_score_hint)?;

        let matched_rules = evidence
            .policy_verdict
            .as_ref()
            .map(|v| v.matched_rules.clone())
            .unwrap_or_default();

        let mut meta = BTreeMap::new();
        if !normalized.substitutions.is_empty() {
            meta.insert(
                "substitutions".to_string(),
                normalized
                    .substitutions
                    .iter()
                    .map(|s| s.reason.clone())
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }

        let outcome = outcome_for(result.verdict);
        self.memory.store(KnowledgeEntry {
            domain: evidence.domain.clone(),
            outcome,
            matched_rules,
            timestamp: evidence.now,
            meta,
        })?;

        tracing::debug!(
            domain = %evidence.domain,
            policy_pack = %evidence.policy_pack,
            ?outcome,
            "recorded resolution outcome in domain memory"
        );

        Ok(result)
    }

    #[must_use]
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }
}

fn outcome_for(verdict: Verdict) -> Outcome {
    match verdict {
        Verdict::Allow => Outcome::Allow,
        Verdict::AllowWithModifications => Outcome::Modify,
        Verdict::Deny => Outcome::Deny,
    }
}
