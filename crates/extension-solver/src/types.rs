//! Core argumentation data model: arguments, attacks, and the framework
//! (A, R) that the solver operates on.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::SolverError;

pub type ArgumentId = String;

/// The closed set of argument kinds the core recognizes.
///
/// Strength modifiers and attack-generation rules are pure functions over
/// this tag; there is no open extension mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    Deny,
    Modify,
    Allow,
    Trust,
    Suspicion,
    Baseline,
}

/// Where an argument's evidence originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentSource {
    Policy,
    Pattern,
    Memory,
    Default,
}

/// An immutable node of the argumentation framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argument {
    pub id: ArgumentId,
    pub kind: ArgumentKind,
    pub strength: OrderedFloat<f64>,
    pub claim: String,
    pub source: ArgumentSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<serde_json::Value>,
}

impl Argument {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: ArgumentKind,
        strength: f64,
        claim: impl Into<String>,
        source: ArgumentSource,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            strength: OrderedFloat(strength),
            claim: claim.into(),
            source,
            evidence: None,
        }
    }

    #[must_use]
    pub fn with_evidence(mut self, evidence: serde_json::Value) -> Self {
        self.evidence = Some(evidence);
        self
    }
}

/// A directed attack edge. Multi-edges collapse; self-attacks are
/// permitted and significant (see the solver's conflict-free rule).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Attack {
    pub attacker: ArgumentId,
    pub target: ArgumentId,
}

impl Attack {
    #[must_use]
    pub fn new(attacker: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            attacker: attacker.into(),
            target: target.into(),
        }
    }
}

/// An abstract argumentation framework (A, R) in the sense of Dung (1995).
///
/// Arguments are stored by id in a `BTreeMap` (sorted, unique); attacks in a
/// `BTreeSet` of (attacker, target) pairs (sorted, deduplicated). Internally
/// the solver additionally assigns each argument a dense index in sorted-id
/// order so adjacency can be represented as bitset arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgumentationFramework {
    arguments: BTreeMap<ArgumentId, Argument>,
    attacks: BTreeSet<(ArgumentId, ArgumentId)>,
}

impl ArgumentationFramework {
    /// Builds and validates a framework. Rejects a non-unique id (the
    /// second insertion of an id) and any attack endpoint that doesn't
    /// resolve in the argument set.
    pub fn build(
        arguments: Vec<Argument>,
        attacks: Vec<Attack>,
    ) -> Result<Self, SolverError> {
        let mut map = BTreeMap::new();
        for argument in arguments {
            let id = argument.id.clone();
            if map.insert(id.clone(), argument).is_some() {
                return Err(SolverError::InvalidFramework(format!(
                    "duplicate argument id '{id}'"
                )));
            }
        }

        let mut attack_set = BTreeSet::new();
        for attack in attacks {
            if !map.contains_key(&attack.attacker) {
                return Err(SolverError::InvalidFramework(format!(
                    "attack references unknown attacker id '{}'",
                    attack.attacker
                )));
            }
            if !map.contains_key(&attack.target) {
                return Err(SolverError::InvalidFramework(format!(
                    "attack references unknown target id '{}'",
                    attack.target
                )));
            }
            attack_set.insert((attack.attacker, attack.target));
        }

        Ok(Self {
            arguments: map,
            attacks: attack_set,
        })
    }

    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.values()
    }

    #[must_use]
    pub fn argument(&self, id: &str) -> Option<&Argument> {
        self.arguments.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn attacks(&self) -> impl Iterator<Item = &(ArgumentId, ArgumentId)> {
        self.attacks.iter()
    }

    /// Whether `attacker` attacks `target`, including self-attacks.
    #[must_use]
    pub fn attacks_between(&self, attacker: &str, target: &str) -> bool {
        self.attacks
            .contains(&(attacker.to_string(), target.to_string()))
    }

    /// Ids in sorted order; this is the canonical index assignment the
    /// solver's bitset representation relies on.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<&ArgumentId> {
        self.arguments.keys().collect()
    }
}

/// The semantics an [`Extension`] was computed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    Grounded,
    Preferred,
    Stable,
}

/// A semantics-specific subset of the argument set, plus the set of
/// arguments it rejects (attacks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    pub kind: ExtensionKind,
    pub members: BTreeSet<ArgumentId>,
    pub rejected: BTreeSet<ArgumentId>,
}

impl Extension {
    /// Sum of member strengths, used for extension-ranking tie-breaks.
    #[must_use]
    pub fn aggregate_strength(&self, framework: &ArgumentationFramework) -> f64 {
        self.members
            .iter()
            .filter_map(|id| framework.argument(id))
            .map(|a| a.strength.0)
            .sum()
    }
}

/// Tunable parameters for the solver, matching the configuration keys
/// enumerated in the system specification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverConfig {
    pub solver_budget_ms: u64,
    pub preferred_enumeration_cap: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver_budget_ms: 50,
            preferred_enumeration_cap: 32,
        }
    }
}
