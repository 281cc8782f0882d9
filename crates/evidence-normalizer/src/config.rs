use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunable parameters for the normalizer, matching the configuration keys
/// enumerated in the system specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    pub trust_strength_floor: f64,
    pub deny_strength_overrides: BTreeMap<String, f64>,
    pub baseline_allow_strength: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        let mut deny_strength_overrides = BTreeMap::new();
        deny_strength_overrides.insert("critical_pii".to_string(), 0.95);
        deny_strength_overrides.insert("domain_blocked".to_string(), 0.92);
        deny_strength_overrides.insert("credential_detected".to_string(), 0.93);

        Self {
            trust_strength_floor: 0.3,
            deny_strength_overrides,
            baseline_allow_strength: 0.3,
        }
    }
}
