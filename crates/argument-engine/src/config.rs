//! Startup configuration. Unknown keys are a hard error (§6): this
//! crate never silently ignores a typo'd config option.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use domain_memory::DEFAULT_HALFLIFE_SECONDS;
use evidence_normalizer::NormalizerConfig;
use extension_solver::SolverConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// All tunable parameters enumerated in the system specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default = "default_solver_budget_ms")]
    pub solver_budget_ms: u64,
    #[serde(default = "default_memory_halflife_seconds")]
    pub memory_halflife_seconds: u64,
    #[serde(default = "default_preferred_enumeration_cap")]
    pub preferred_enumeration_cap: usize,
    #[serde(default = "default_trust_strength_floor")]
    pub trust_strength_floor: f64,
    #[serde(default = "default_deny_strength_overrides")]
    pub deny_strength_overrides: BTreeMap<String, f64>,
    #[serde(default = "default_baseline_allow_strength")]
    pub baseline_allow_strength: f64,
}

fn default_solver_budget_ms() -> u64 {
    50
}

fn default_memory_halflife_seconds() -> u64 {
    DEFAULT_HALFLIFE_SECONDS
}

fn default_preferred_enumeration_cap() -> usize {
    32
}

fn default_trust_strength_floor() -> f64 {
    0.3
}

fn default_baseline_allow_strength() -> f64 {
    0.3
}

fn default_deny_strength_overrides() -> BTreeMap<String, f64> {
    NormalizerConfig::default().deny_strength_overrides
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            solver_budget_ms: default_solver_budget_ms(),
            memory_halflife_seconds: default_memory_halflife_seconds(),
            preferred_enumeration_cap: default_preferred_enumeration_cap(),
            trust_strength_floor: default_trust_strength_floor(),
            deny_strength_overrides: default_deny_strength_overrides(),
            baseline_allow_strength: default_baseline_allow_strength(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file. Rejects unknown keys.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    #[must_use]
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            solver_budget_ms: self.solver_budget_ms,
            preferred_enumeration_cap: self.preferred_enumeration_cap,
        }
    }

    #[must_use]
    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig {
            trust_strength_floor: self.trust_strength_floor,
            deny_strength_overrides: self.deny_strength_overrides.clone(),
            baseline_allow_strength: self.baseline_allow_strength,
        }
    }
}
