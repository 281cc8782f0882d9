//! Deterministic transformation of policy, pattern, and memory evidence
//! into a typed argument set and attack relation.

use std::collections::BTreeMap;

use domain_memory::{MemoryStore, ReputationLabel};
use extension_solver::{Argument, ArgumentKind, ArgumentSource, ArgumentationFramework, Attack};
use serde_json::json;

use crate::config::NormalizerConfig;
use crate::error::NormalizerError;
use crate::types::{Evidence, PolicyVerdict, Substitution};

/// Base strength for a deny argument whose reason prefix has no override.
const BASE_DENY_STRENGTH: f64 = 0.9;
const MODIFY_STRENGTH: f64 = 0.7;
const POLICY_UNAVAILABLE_SUSPICION_STRENGTH: f64 = 0.4;
/// Policy pack tag that exempts pattern-triggered PII denies (§4.2, S4).
const RESEARCH_PACK: &str = "research";

/// The result of normalization: a built framework plus a record of any
/// substitutions made in place of a failed or absent collaborator.
pub struct NormalizationOutput {
    pub framework: ArgumentationFramework,
    pub substitutions: Vec<Substitution>,
}

fn reason_class(reason: &str) -> &str {
    reason.split(':').next().unwrap_or(reason)
}

/// Dominance rank used to decide whether one Deny argument attacks
/// another from a conflicting reason class (§4.2). Higher dominates lower;
/// equal ranks coexist.
fn dominance_rank(class: &str) -> u8 {
    match class {
        "critical_pii" => 3,
        "domain_blocked" | "credential_detected" => 2,
        _ => 1,
    }
}

fn deny_strength(class: &str, config: &NormalizerConfig) -> f64 {
    config
        .deny_strength_overrides
        .get(class)
        .copied()
        .unwrap_or(BASE_DENY_STRENGTH)
}

/// Normalizes `evidence` into an `(A, R)` pair, querying `memory` for the
/// domain's reputation. Deterministic: identical evidence and memory state
/// always produce the same framework.
#[allow(clippy::too_many_lines)]
pub fn normalize(
    evidence: &Evidence,
    memory: &MemoryStore,
    config: &NormalizerConfig,
) -> Result<NormalizationOutput, NormalizerError> {
    let mut arguments: Vec<Argument> = Vec::new();
    let mut substitutions: Vec<Substitution> = Vec::new();
    // (id, reason_class) for dominance-based deny-vs-deny attacks.
    let mut deny_classes: Vec<(String, String)> = Vec::new();
    let mut modify_ids: Vec<String> = Vec::new();

    let verdict: PolicyVerdict = if let Some(v) = &evidence.policy_verdict {
        v.clone()
    } else {
        let id = "suspicion:policy_unavailable".to_string();
        arguments.push(
            Argument::new(
                id.clone(),
                ArgumentKind::Suspicion,
                POLICY_UNAVAILABLE_SUSPICION_STRENGTH,
                "policy evaluator was unavailable",
                ArgumentSource::Default,
            )
            .with_evidence(json!({ "domain": evidence.domain })),
        );
        substitutions.push(Substitution {
            reason: "PolicyUnavailable".to_string(),
            inserted_argument_id: id,
        });
        PolicyVerdict::default()
    };

    // Rule 1: deny_reasons -> Deny arguments.
    let mut seen_ids: BTreeMap<String, usize> = BTreeMap::new();
    for reason in &verdict.deny_reasons {
        let class = reason_class(reason).to_string();
        let mut id = format!("deny:{reason}");
        let count = seen_ids.entry(id.clone()).or_insert(0);
        if *count > 0 {
            id = format!("{id}#{count}");
        }
        *count += 1;

        let strength = deny_strength(&class, config);
        arguments.push(
            Argument::new(
                id.clone(),
                ArgumentKind::Deny,
                strength,
                reason.clone(),
                ArgumentSource::Policy,
            )
            .with_evidence(json!({ "reason": reason, "domain": evidence.domain })),
        );
        deny_classes.push((id, class));
    }

    // Rule 2: modification_list -> Modify arguments.
    for modification in &verdict.modification_list {
        let id = format!("modify:{modification}");
        arguments.push(
            Argument::new(
                id.clone(),
                ArgumentKind::Modify,
                MODIFY_STRENGTH,
                modification.clone(),
                ArgumentSource::Policy,
            )
            .with_evidence(json!({ "modification": modification })),
        );
        modify_ids.push(id);
    }

    // Rule 3: pattern-triggered Deny for critical PII, suppressed for the
    // research pack and when an equivalent deny already exists.
    let has_deny_already = !deny_classes.is_empty();
    if evidence.pattern_counters.has_critical_pii()
        && !has_deny_already
        && evidence.policy_pack != RESEARCH_PACK
    {
        let id = "deny:pattern_pii".to_string();
        arguments.push(
            Argument::new(
                id.clone(),
                ArgumentKind::Deny,
                deny_strength("critical_pii", config),
                "sensitive-pattern detector found SSN or credit-card numbers",
                ArgumentSource::Pattern,
            )
            .with_evidence(json!({
                "ssn": evidence.pattern_counters.ssn,
                "credit_card": evidence.pattern_counters.credit_card,
            })),
        );
        deny_classes.push((id, "critical_pii".to_string()));
    }

    // Rule 4: memory reputation -> Trust or Suspicion.
    let reputation = memory.reputation(&evidence.domain, evidence.now);
    let mut trust_id: Option<String> = None;
    let mut suspicion_memory_id: Option<String> = None;
    match reputation.label {
        ReputationLabel::Trusted => {
            let id = "trust:memory".to_string();
            let strength = config.trust_strength_floor + 0.5 * reputation.score;
            arguments.push(
                Argument::new(
                    id.clone(),
                    ArgumentKind::Trust,
                    strength,
                    format!("domain {} has a trusted history", evidence.domain),
                    ArgumentSource::Memory,
                )
                .with_evidence(json!({ "score": reputation.score, "sample_count": reputation.sample_count })),
            );
            trust_id = Some(id);
        }
        ReputationLabel::Suspicious => {
            let id = "suspicion:memory".to_string();
            let strength = config.trust_strength_floor + 0.5 * reputation.score.abs();
            arguments.push(
                Argument::new(
                    id.clone(),
                    ArgumentKind::Suspicion,
                    strength,
                    format!("domain {} has a suspicious history", evidence.domain),
                    ArgumentSource::Memory,
                )
                .with_evidence(json!({ "score": reputation.score, "sample_count": reputation.sample_count })),
            );
            suspicion_memory_id = Some(id);
        }
        ReputationLabel::Mixed | ReputationLabel::Unknown => {}
    }

    // Rule 5: baseline allow, always present.
    let baseline_id = "baseline:allow".to_string();
    arguments.push(Argument::new(
        baseline_id.clone(),
        ArgumentKind::Baseline,
        config.baseline_allow_strength,
        "default posture is to allow content absent a defeating argument",
        ArgumentSource::Default,
    ));

    // --- Attack relation (§4.2) ---
    let mut attacks: Vec<Attack> = Vec::new();
    let strength_of: BTreeMap<&str, f64> = arguments.iter().map(|a| (a.id.as_str(), a.strength.0)).collect();

    for (deny_id, _) in &deny_classes {
        attacks.push(Attack::new(deny_id.clone(), baseline_id.clone()));
        for modify_id in &modify_ids {
            attacks.push(Attack::new(deny_id.clone(), modify_id.clone()));
        }
        if let Some(trust_id) = &trust_id {
            attacks.push(Attack::new(deny_id.clone(), trust_id.clone()));
        }
    }
    for modify_id in &modify_ids {
        attacks.push(Attack::new(modify_id.clone(), baseline_id.clone()));
    }

    // Deny-vs-deny dominance attacks.
    for i in 0..deny_classes.len() {
        for j in 0..deny_classes.len() {
            if i == j {
                continue;
            }
            let (id_a, class_a) = &deny_classes[i];
            let (id_b, class_b) = &deny_classes[j];
            if dominance_rank(class_a) > dominance_rank(class_b) {
                attacks.push(Attack::new(id_a.clone(), id_b.clone()));
            }
        }
    }

    // Trust attacks every Deny/Modify whose source is Memory, or whose
    // strength is <= Trust's own strength.
    if let Some(trust_id) = &trust_id {
        let trust_strength = strength_of[trust_id.as_str()];
        for (deny_id, _) in &deny_classes {
            let deny_strength = strength_of[deny_id.as_str()];
            if deny_strength <= trust_strength {
                attacks.push(Attack::new(trust_id.clone(), deny_id.clone()));
            }
        }
        for modify_id in &modify_ids {
            let modify_strength = strength_of[modify_id.as_str()];
            if modify_strength <= trust_strength {
                attacks.push(Attack::new(trust_id.clone(), modify_id.clone()));
            }
        }
    }

    // Suspicion (from either source) attacks Baseline and every Trust.
    let mut suspicion_ids: Vec<String> = Vec::new();
    if let Some(id) = suspicion_memory_id {
        suspicion_ids.push(id);
    }
    if evidence.policy_verdict.is_none() {
        suspicion_ids.push("suspicion:policy_unavailable".to_string());
    }
    for suspicion_id in &suspicion_ids {
        attacks.push(Attack::new(suspicion_id.clone(), baseline_id.clone()));
        if let Some(trust_id) = &trust_id {
            attacks.push(Attack::new(suspicion_id.clone(), trust_id.clone()));
        }
    }

    let framework = ArgumentationFramework::build(arguments, attacks)?;

    tracing::debug!(
        domain = %evidence.domain,
        arguments = framework.len(),
        substitutions = substitutions.len(),
        "normalized evidence into argumentation framework"
    );

    Ok(NormalizationOutput {
        framework,
        substitutions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PatternCounters;
    use domain_memory::{KnowledgeEntry, Outcome, DEFAULT_HALFLIFE_SECONDS};
    use std::collections::BTreeMap as Map;

    fn memory_store() -> MemoryStore {
        let dir = tempfile::tempdir().unwrap();
        MemoryStore::open(dir.path().join("memory.log"), DEFAULT_HALFLIFE_SECONDS).unwrap()
    }

    #[test]
    fn s1_clean_yields_only_baseline() {
        let memory = memory_store();
        let evidence = Evidence {
            domain: "clean.example".to_string(),
            policy_pack: "standard".to_string(),
            policy_verdict: Some(PolicyVerdict {
                decision: "allow".to_string(),
                ..Default::default()
            }),
            pattern_counters: PatternCounters::default(),
            now: 1_000,
        };
        let output = normalize(&evidence, &memory, &NormalizerConfig::default()).unwrap();
        assert_eq!(output.framework.len(), 1);
        assert!(output.framework.argument("baseline:allow").is_some());
    }

    #[test]
    fn s2_ssn_override_creates_critical_deny() {
        let memory = memory_store();
        let evidence = Evidence {
            domain: "leaky.example".to_string(),
            policy_pack: "standard".to_string(),
            policy_verdict: Some(PolicyVerdict {
                decision: "deny".to_string(),
                deny_reasons: vec!["critical_pii: 2 SSN(s) detected".to_string()],
                ..Default::default()
            }),
            pattern_counters: PatternCounters {
                ssn: 2,
                ..Default::default()
            },
            now: 1_000,
        };
        let output = normalize(&evidence, &memory, &NormalizerConfig::default()).unwrap();
        let deny = output
            .framework
            .arguments()
            .find(|a| a.kind == ArgumentKind::Deny)
            .unwrap();
        assert!((deny.strength.0 - 0.95).abs() < 1e-9);
        assert!(output
            .framework
            .attacks_between(&deny.id, "baseline:allow"));
    }

    #[test]
    fn s4_research_pack_suppresses_pattern_deny() {
        let memory = memory_store();
        let evidence = Evidence {
            domain: "lab.example".to_string(),
            policy_pack: "research".to_string(),
            policy_verdict: Some(PolicyVerdict::default()),
            pattern_counters: PatternCounters {
                ssn: 1,
                ..Default::default()
            },
            now: 1_000,
        };
        let output = normalize(&evidence, &memory, &NormalizerConfig::default()).unwrap();
        assert!(!output.framework.arguments().any(|a| a.kind == ArgumentKind::Deny));
    }

    #[test]
    fn s3_trusted_domain_adds_trust_argument_attacking_modify() {
        let memory = memory_store();
        for t in 0..50 {
            memory
                .store(KnowledgeEntry {
                    domain: "trusted.example".to_string(),
                    outcome: Outcome::Allow,
                    matched_rules: vec![],
                    timestamp: t,
                    meta: Map::new(),
                })
                .unwrap();
        }
        let evidence = Evidence {
            domain: "trusted.example".to_string(),
            policy_pack: "standard".to_string(),
            policy_verdict: Some(PolicyVerdict {
                decision: "modify".to_string(),
                modification_list: vec!["pii_redaction".to_string()],
                ..Default::default()
            }),
            pattern_counters: PatternCounters {
                email: 3,
                ..Default::default()
            },
            now: 49,
        };
        let output = normalize(&evidence, &memory, &NormalizerConfig::default()).unwrap();
        assert!(output.framework.argument("trust:memory").is_some());
        assert!(output
            .framework
            .attacks_between("trust:memory", "modify:pii_redaction"));
    }

    #[test]
    fn policy_unavailable_inserts_suspicion_and_records_substitution() {
        let memory = memory_store();
        let evidence = Evidence {
            domain: "unknown.example".to_string(),
            policy_pack: "standard".to_string(),
            policy_verdict: None,
            pattern_counters: PatternCounters::default(),
            now: 1_000,
        };
        let output = normalize(&evidence, &memory, &NormalizerConfig::default()).unwrap();
        assert_eq!(output.substitutions.len(), 1);
        assert!(output
            .framework
            .argument("suspicion:policy_unavailable")
            .is_some());
    }
}
