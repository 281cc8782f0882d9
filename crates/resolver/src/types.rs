//! Output shapes produced by the resolver.

use std::collections::BTreeMap;

use extension_solver::{ArgumentId, Extension};
use serde::{Deserialize, Serialize};

/// The final decision handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    AllowWithModifications,
    Deny,
}

/// One entry in the human- and machine-readable explanation: a surviving
/// argument, its claim, and every argument it defeats in the chosen
/// extension's defeated map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationEntry {
    pub winner: ArgumentId,
    pub claim: String,
    pub defeats: Vec<ArgumentId>,
}

/// The full set of extensions computed by the solver, carried through for
/// auditability even though only `chosen_extension` drove the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionsByKind {
    pub grounded: Extension,
    pub preferred: Vec<Extension>,
    pub stable: Vec<Extension>,
}

/// The tuple the specification calls `ResolutionResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub verdict: Verdict,
    pub risk_score: f64,
    pub chosen_extension: Extension,
    pub all_extensions: ExtensionsByKind,
    pub defeated_map: BTreeMap<ArgumentId, ArgumentId>,
    pub explanation: Vec<ExplanationEntry>,
    pub time_budget_exceeded: bool,
}
