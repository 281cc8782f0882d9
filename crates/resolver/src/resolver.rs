//! Turns a solver's extensions into a verdict, risk score, and explanation.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use extension_solver::{Argument, ArgumentId, ArgumentKind, ArgumentationFramework, Extension, SolverOutput};

use crate::determinism::compute_fingerprint;
use crate::error::ResolverError;
use crate::types::{ExplanationEntry, ExtensionsByKind, ResolutionResult, Verdict};

fn risk_weight(kind: ArgumentKind) -> f64 {
    match kind {
        ArgumentKind::Deny => 40.0,
        ArgumentKind::Modify => 15.0,
        ArgumentKind::Suspicion => 25.0,
        ArgumentKind::Trust => -20.0,
        ArgumentKind::Allow | ArgumentKind::Baseline => 0.0,
    }
}

/// Picks the extension that drives the final verdict: grounded by
/// default, or the highest-summed-strength preferred extension when
/// grounded is empty (tie: more members; tie: lexical on sorted ids).
/// Errs if grounded is empty and the solver found no preferred extension
/// either, since then there is nothing authoritative to select.
fn select_authoritative<'a>(
    output: &'a SolverOutput,
    framework: &ArgumentationFramework,
) -> Result<&'a Extension, ResolverError> {
    if !output.grounded.members.is_empty() {
        return Ok(&output.grounded);
    }
    if output.preferred.is_empty() {
        return Err(ResolverError::NoAuthoritativeExtension);
    }

    Ok(output
        .preferred
        .iter()
        .min_by_key(|ext| {
            let strength = ordered_float::OrderedFloat(ext.aggregate_strength(framework));
            let ids: Vec<&str> = ext.members.iter().map(String::as_str).collect();
            (Reverse(strength), Reverse(ext.members.len()), ids)
        })
        .unwrap_or(&output.grounded))
}

fn derive_verdict(chosen: &Extension, framework: &ArgumentationFramework) -> Verdict {
    let kinds: Vec<ArgumentKind> = chosen
        .members
        .iter()
        .filter_map(|id| framework.argument(id))
        .map(|a| a.kind)
        .collect();

    if kinds.contains(&ArgumentKind::Deny) {
        Verdict::Deny
    } else if kinds.contains(&ArgumentKind::Modify) {
        Verdict::AllowWithModifications
    } else {
        Verdict::Allow
    }
}

fn compute_risk_score(chosen: &Extension, framework: &ArgumentationFramework, policy_risk_score_hint: f64) -> f64 {
    let raw: f64 = chosen
        .members
        .iter()
        .filter_map(|id| framework.argument(id))
        .map(|a| a.strength.0 * risk_weight(a.kind))
        .sum();
    let raw = raw.clamp(0.0, 100.0);
    (0.75 * raw + 0.25 * policy_risk_score_hint.clamp(0.0, 100.0)).clamp(0.0, 100.0)
}

/// For each argument not in `chosen` but attacked by some member of
/// `chosen`, records the attacking member with the highest strength
/// (tie: lexical id).
fn build_defeated_map(
    chosen: &Extension,
    framework: &ArgumentationFramework,
) -> BTreeMap<ArgumentId, ArgumentId> {
    let mut defeated_map = BTreeMap::new();

    for argument in framework.arguments() {
        if chosen.members.contains(&argument.id) {
            continue;
        }
        let mut best: Option<&Argument> = None;
        for winner_id in &chosen.members {
            if !framework.attacks_between(winner_id, &argument.id) {
                continue;
            }
            let Some(winner) = framework.argument(winner_id) else {
                continue;
            };
            best = Some(match best {
                None => winner,
                Some(current) if winner.strength > current.strength => winner,
                Some(current) if winner.strength == current.strength && winner.id < current.id => winner,
                Some(current) => current,
            });
        }
        if let Some(winner) = best {
            defeated_map.insert(argument.id.clone(), winner.id.clone());
        }
    }

    defeated_map
}

fn build_explanation(
    chosen: &Extension,
    defeated_map: &BTreeMap<ArgumentId, ArgumentId>,
    framework: &ArgumentationFramework,
) -> Vec<ExplanationEntry> {
    let mut entries: Vec<ExplanationEntry> = chosen
        .members
        .iter()
        .filter_map(|id| framework.argument(id))
        .map(|winner| {
            let mut defeats: Vec<ArgumentId> = defeated_map
                .iter()
                .filter(|(_, w)| *w == &winner.id)
                .map(|(defeated, _)| defeated.clone())
                .collect();
            defeats.sort();
            ExplanationEntry {
                winner: winner.id.clone(),
                claim: winner.claim.clone(),
                defeats,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        let strength_a = framework.argument(&a.winner).map_or(0.0, |arg| arg.strength.0);
        let strength_b = framework.argument(&b.winner).map_or(0.0, |arg| arg.strength.0);
        strength_b
            .partial_cmp(&strength_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.winner.cmp(&b.winner))
    });

    entries
}

/// Resolves a solved framework into the final decision. `policy_risk_score_hint`
/// is the external policy evaluator's own 0-100 risk estimate, blended in at
/// weight 0.25.
///
/// # Errors
///
/// Returns [`ResolverError::NoAuthoritativeExtension`] when the grounded
/// extension is empty and the solver found no preferred extension either
/// (e.g. the preferred search was aborted by its time budget), since then
/// there is no extension left to drive a verdict from.
pub fn resolve(
    framework: &ArgumentationFramework,
    solver_output: &SolverOutput,
    policy_risk_score_hint: f64,
) -> Result<ResolutionResult, ResolverError> {
    let chosen = select_authoritative(solver_output, framework)?.clone();
    let verdict = derive_verdict(&chosen, framework);
    let risk_score = compute_risk_score(&chosen, framework, policy_risk_score_hint);
    let defeated_map = build_defeated_map(&chosen, framework);
    let explanation = build_explanation(&chosen, &defeated_map, framework);

    let result = ResolutionResult {
        verdict,
        risk_score,
        chosen_extension: chosen,
        all_extensions: ExtensionsByKind {
            grounded: solver_output.grounded.clone(),
            preferred: solver_output.preferred.clone(),
            stable: solver_output.stable.clone(),
        },
        defeated_map,
        explanation,
        time_budget_exceeded: solver_output.time_budget_exceeded,
    };

    tracing::debug!(
        ?verdict,
        risk_score,
        chosen_size = result.chosen_extension.members.len(),
        time_budget_exceeded = result.time_budget_exceeded,
        fingerprint = %compute_fingerprint(&result),
        "resolved argumentation framework to a verdict"
    );

    Ok(result)
}
