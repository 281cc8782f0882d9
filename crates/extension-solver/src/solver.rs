//! Fixed-point computation of the grounded extension, and labelling-style
//! depth-first enumeration of preferred and stable extensions.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::bitset::Bitset;
use crate::error::SolverError;
use crate::types::{ArgumentationFramework, ArgumentId, Extension, ExtensionKind, SolverConfig};

/// Precomputed adjacency used by every algorithm in this module.
struct Adjacency {
    ids: Vec<ArgumentId>,
    /// `attackers_of[i]` = indices of arguments attacking argument `i`.
    attackers_of: Vec<Bitset>,
    /// `attacks_from[i]` = indices of arguments argument `i` attacks.
    attacks_from: Vec<Bitset>,
    /// Strength order (descending), used to pick the next branching
    /// argument in the preferred search. Ties break by lexical id, which
    /// `sorted_ids()` already guarantees for equal strength since indices
    /// are assigned in id order.
    strength_order: Vec<usize>,
}

impl Adjacency {
    fn build(framework: &ArgumentationFramework) -> Self {
        let ids: Vec<ArgumentId> = framework.sorted_ids().into_iter().cloned().collect();
        let n = ids.len();
        let index_of = |id: &str| ids.iter().position(|x| x == id).expect("attack endpoint resolves");

        let mut attackers_of = vec![Bitset::empty(n); n];
        let mut attacks_from = vec![Bitset::empty(n); n];
        for (attacker, target) in framework.attacks() {
            let a = index_of(attacker);
            let t = index_of(target);
            attackers_of[t].insert(a);
            attacks_from[a].insert(t);
        }

        let mut strength_order: Vec<usize> = (0..n).collect();
        strength_order.sort_by(|&a, &b| {
            let sa = framework.argument(&ids[a]).unwrap().strength;
            let sb = framework.argument(&ids[b]).unwrap().strength;
            sb.cmp(&sa).then_with(|| ids[a].cmp(&ids[b]))
        });

        Self {
            ids,
            attackers_of,
            attacks_from,
            strength_order,
        }
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    /// Dung's characteristic function: the set of arguments defended by `s`.
    fn characteristic_function(&self, s: &Bitset) -> Bitset {
        let n = self.len();
        let mut out = Bitset::empty(n);
        for a in 0..n {
            let attackers = &self.attackers_of[a];
            let defended = attackers
                .iter_ones()
                .all(|b| s.intersects(&self.attackers_of[b]));
            if defended {
                out.insert(a);
            }
        }
        out
    }

    fn conflict_free(&self, s: &Bitset) -> bool {
        s.iter_ones().all(|a| !self.attackers_of[a].intersects(s))
    }

    fn is_admissible(&self, s: &Bitset) -> bool {
        self.conflict_free(s) && s.is_subset_of(&self.characteristic_function(s))
    }

    fn rejected_by(&self, s: &Bitset) -> BTreeSet<ArgumentId> {
        let n = self.len();
        let mut rejected = Bitset::empty(n);
        for a in s.iter_ones() {
            rejected.union_with(&self.attacks_from[a]);
        }
        rejected.iter_ones().map(|i| self.ids[i].clone()).collect()
    }

    fn to_extension(&self, s: &Bitset, kind: ExtensionKind) -> Extension {
        Extension {
            kind,
            members: s.iter_ones().map(|i| self.ids[i].clone()).collect(),
            rejected: self.rejected_by(s),
        }
    }
}

/// Computes the grounded extension: the limit of F^n(∅). Converges in at
/// most |A| steps for any valid framework; never fails.
fn compute_grounded(adjacency: &Adjacency) -> Bitset {
    let n = adjacency.len();
    let mut s = Bitset::empty(n);
    for _ in 0..=n {
        let next = adjacency.characteristic_function(&s);
        if next == s {
            return s;
        }
        s = next;
    }
    s
}

struct SearchState<'a> {
    adjacency: &'a Adjacency,
    deadline: Instant,
    timed_out: bool,
    found: Vec<Bitset>,
}

impl SearchState<'_> {
    fn search(&mut self, in_set: Bitset, excluded: Bitset, next_branch: usize) {
        if self.timed_out {
            return;
        }
        if Instant::now() >= self.deadline {
            self.timed_out = true;
            return;
        }

        // Skip already-decided (IN or explicitly excluded) arguments.
        let order = &self.adjacency.strength_order;
        let mut branch = next_branch;
        while branch < order.len()
            && (in_set.contains(order[branch]) || excluded.contains(order[branch]))
        {
            branch += 1;
        }

        if branch == order.len() {
            if self.adjacency.is_admissible(&in_set) {
                self.found.push(in_set);
            }
            return;
        }

        let candidate = order[branch];

        // Branch 1: candidate OUT.
        let mut excluded_out = excluded.clone();
        excluded_out.insert(candidate);
        self.search(in_set.clone(), excluded_out, branch + 1);
        if self.timed_out {
            return;
        }

        // Branch 2: candidate IN, pruned when it breaks conflict-freeness
        // (this also excludes every self-attacking argument, since a
        // self-attacker is always a conflict with itself).
        if !self.adjacency.attackers_of[candidate].intersects(&in_set)
            && !self.adjacency.attacks_from[candidate].intersects(&in_set)
        {
            let in_with_candidate = in_set.with_inserted(candidate);
            self.search(in_with_candidate, excluded, branch + 1);
        }
    }
}

/// Enumerates maximal admissible sets (the preferred extensions) via
/// bounded depth-first search. Returns `None` if the search is aborted by
/// the size cap or the time budget.
fn compute_preferred(
    adjacency: &Adjacency,
    config: &SolverConfig,
) -> Option<Vec<Bitset>> {
    if adjacency.len() > config.preferred_enumeration_cap {
        return None;
    }

    let n = adjacency.len();
    let mut state = SearchState {
        adjacency,
        deadline: Instant::now() + Duration::from_millis(config.solver_budget_ms),
        timed_out: false,
        found: Vec::new(),
    };
    state.search(Bitset::empty(n), Bitset::empty(n), 0);

    if state.timed_out {
        return None;
    }

    // Keep only maximal sets under inclusion.
    let mut maximal: Vec<Bitset> = Vec::new();
    'outer: for candidate in &state.found {
        let mut keep = Vec::with_capacity(maximal.len());
        for existing in maximal.drain(..) {
            if candidate.is_subset_of(&existing) {
                keep.push(existing);
                continue 'outer;
            }
            if !existing.is_subset_of(candidate) {
                keep.push(existing);
            }
        }
        keep.push(candidate.clone());
        maximal = keep;
    }

    // Deduplicate (distinct `found` entries can coincide after the
    // subset-removal pass above).
    let mut unique: Vec<Bitset> = Vec::new();
    for m in maximal {
        if !unique.contains(&m) {
            unique.push(m);
        }
    }
    Some(unique)
}

fn sort_extensions(mut extensions: Vec<Extension>, framework: &ArgumentationFramework) -> Vec<Extension> {
    extensions.sort_by(|a, b| {
        let sa = a.aggregate_strength(framework);
        let sb = b.aggregate_strength(framework);
        sb.partial_cmp(&sa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                let ids_a: Vec<&ArgumentId> = a.members.iter().collect();
                let ids_b: Vec<&ArgumentId> = b.members.iter().collect();
                ids_a.cmp(&ids_b)
            })
    });
    extensions
}

/// The full result of solving an argumentation framework.
#[derive(Debug, Clone)]
pub struct SolverOutput {
    pub grounded: Extension,
    pub preferred: Vec<Extension>,
    pub stable: Vec<Extension>,
    pub time_budget_exceeded: bool,
}

/// Computes the grounded extension (always), then attempts preferred and
/// stable unless the framework exceeds `preferred_enumeration_cap` or the
/// search exceeds `solver_budget_ms`, in which case only the grounded
/// extension is returned with `time_budget_exceeded = true`.
pub fn solve(
    framework: &ArgumentationFramework,
    config: &SolverConfig,
) -> Result<SolverOutput, SolverError> {
    let started = Instant::now();
    let adjacency = Adjacency::build(framework);

    let grounded_bits = compute_grounded(&adjacency);
    let grounded = adjacency.to_extension(&grounded_bits, ExtensionKind::Grounded);

    let preferred_bits = compute_preferred(&adjacency, config);
    let time_budget_exceeded = preferred_bits.is_none();

    let preferred: Vec<Extension> = preferred_bits
        .unwrap_or_default()
        .into_iter()
        .map(|s| adjacency.to_extension(&s, ExtensionKind::Preferred))
        .collect();
    let preferred = sort_extensions(preferred, framework);

    let stable: Vec<Extension> = preferred
        .iter()
        .filter(|ext| {
            let n = adjacency.len();
            let mut members_bits = Bitset::empty(n);
            for id in &ext.members {
                let idx = adjacency.ids.iter().position(|x| x == id).unwrap();
                members_bits.insert(idx);
            }
            (0..n)
                .filter(|i| !members_bits.contains(*i))
                .all(|i| adjacency.attackers_of[i].intersects(&members_bits))
        })
        .cloned()
        .map(|mut ext| {
            ext.kind = ExtensionKind::Stable;
            ext
        })
        .collect();

    tracing::debug!(
        arguments = framework.len(),
        grounded_size = grounded.members.len(),
        preferred_count = preferred.len(),
        stable_count = stable.len(),
        time_budget_exceeded,
        elapsed_us = started.elapsed().as_micros(),
        "solved argumentation framework"
    );

    Ok(SolverOutput {
        grounded,
        preferred,
        stable,
        time_budget_exceeded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Argument, ArgumentKind, ArgumentSource, Attack};

    fn arg(id: &str, kind: ArgumentKind, strength: f64) -> Argument {
        Argument::new(id, kind, strength, format!("claim for {id}"), ArgumentSource::Default)
    }

    #[test]
    fn grounded_uniqueness_and_minimality_simple_chain() {
        // a attacks b attacks c: grounded = {a, c}
        let framework = ArgumentationFramework::build(
            vec![
                arg("a", ArgumentKind::Deny, 0.9),
                arg("b", ArgumentKind::Modify, 0.7),
                arg("c", ArgumentKind::Allow, 0.3),
            ],
            vec![Attack::new("a", "b"), Attack::new("b", "c")],
        )
        .unwrap();

        let output = solve(&framework, &SolverConfig::default()).unwrap();
        let members: BTreeSet<_> = output.grounded.members.iter().cloned().collect();
        assert_eq!(members, BTreeSet::from(["a".to_string(), "c".to_string()]));
    }

    #[test]
    fn self_attacker_excluded_from_every_extension() {
        let framework = ArgumentationFramework::build(
            vec![
                arg("a", ArgumentKind::Deny, 0.9),
                arg("baseline", ArgumentKind::Baseline, 0.3),
            ],
            vec![Attack::new("a", "a")],
        )
        .unwrap();

        let output = solve(&framework, &SolverConfig::default()).unwrap();
        assert!(!output.grounded.members.contains("a"));
        for ext in &output.preferred {
            assert!(!ext.members.contains("a"));
        }
    }

    #[test]
    fn admissibility_holds_for_every_returned_extension() {
        let framework = ArgumentationFramework::build(
            vec![
                arg("deny1", ArgumentKind::Deny, 0.8),
                arg("deny2", ArgumentKind::Deny, 0.8),
                arg("suspicion", ArgumentKind::Suspicion, 0.5),
                arg("baseline", ArgumentKind::Baseline, 0.3),
            ],
            vec![
                Attack::new("deny1", "deny2"),
                Attack::new("deny2", "deny1"),
                Attack::new("suspicion", "deny1"),
                Attack::new("deny1", "baseline"),
                Attack::new("deny2", "baseline"),
            ],
        )
        .unwrap();

        let output = solve(&framework, &SolverConfig::default()).unwrap();
        let adjacency = Adjacency::build(&framework);
        for ext in output
            .preferred
            .iter()
            .chain(output.stable.iter())
            .chain(std::iter::once(&output.grounded))
        {
            let mut bits = Bitset::empty(adjacency.len());
            for id in &ext.members {
                let idx = adjacency.ids.iter().position(|x| x == id).unwrap();
                bits.insert(idx);
            }
            assert!(adjacency.is_admissible(&bits), "extension not admissible: {ext:?}");
        }
    }

    #[test]
    fn stable_extensions_are_always_preferred() {
        let framework = ArgumentationFramework::build(
            vec![
                arg("deny1", ArgumentKind::Deny, 0.8),
                arg("deny2", ArgumentKind::Deny, 0.8),
                arg("suspicion", ArgumentKind::Suspicion, 0.5),
                arg("baseline", ArgumentKind::Baseline, 0.3),
            ],
            vec![
                Attack::new("deny1", "deny2"),
                Attack::new("deny2", "deny1"),
                Attack::new("suspicion", "deny1"),
                Attack::new("deny1", "baseline"),
                Attack::new("deny2", "baseline"),
            ],
        )
        .unwrap();

        let output = solve(&framework, &SolverConfig::default()).unwrap();
        for stable_ext in &output.stable {
            let found = output
                .preferred
                .iter()
                .any(|p| p.members == stable_ext.members);
            assert!(found, "stable extension not found among preferred: {stable_ext:?}");
        }
    }

    #[test]
    fn determinism_identical_inputs_identical_outputs() {
        let framework = ArgumentationFramework::build(
            vec![
                arg("a", ArgumentKind::Deny, 0.9),
                arg("b", ArgumentKind::Modify, 0.7),
                arg("c", ArgumentKind::Allow, 0.3),
            ],
            vec![Attack::new("a", "b"), Attack::new("b", "c")],
        )
        .unwrap();

        let first = solve(&framework, &SolverConfig::default()).unwrap();
        let second = solve(&framework, &SolverConfig::default()).unwrap();
        assert_eq!(first.grounded.members, second.grounded.members);
        let first_ids: Vec<_> = first.preferred.iter().map(|e| e.members.clone()).collect();
        let second_ids: Vec<_> = second.preferred.iter().map(|e| e.members.clone()).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn time_budget_exceeded_returns_grounded_only() {
        // Dense mutually-attacking graph sized above the default cap.
        let mut arguments = Vec::new();
        let mut attacks = Vec::new();
        for i in 0..40 {
            arguments.push(arg(&format!("a{i}"), ArgumentKind::Deny, 0.5));
        }
        for i in 0..40 {
            for j in 0..40 {
                if i != j {
                    attacks.push(Attack::new(format!("a{i}"), format!("a{j}")));
                }
            }
        }
        let framework = ArgumentationFramework::build(arguments, attacks).unwrap();

        let config = SolverConfig {
            solver_budget_ms: 1,
            preferred_enumeration_cap: 32,
        };
        let output = solve(&framework, &config).unwrap();
        assert!(output.time_budget_exceeded);
        assert!(output.preferred.is_empty());
        assert!(output.stable.is_empty());
    }
}
