//! Byte-stable serialization and fingerprinting for `ResolutionResult`.
//!
//! Canonical JSON (sorted keys, normalized floats) plus a SHA-256
//! fingerprint give callers a way to assert that two resolutions of
//! identical evidence produced byte-identical output (Testable Property 4)
//! and to compare decay-law outputs at fixed precision (Testable Property 6).

use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Precision for float normalization (1e-9 means 9 decimal places).
pub const FLOAT_PRECISION: f64 = 1e-9;

/// A deterministic fingerprint (SHA-256 hash in hex).
pub type Fingerprint = String;

/// Normalizes a float to a fixed-precision representation. NaN becomes
/// `0.0`; infinities clamp to `f64::MAX`/`f64::MIN`.
#[must_use]
pub fn float_normalize(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    if value.is_infinite() {
        return if value.is_sign_positive() { f64::MAX } else { f64::MIN };
    }
    (value / FLOAT_PRECISION).round() * FLOAT_PRECISION
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
enum CanonicalValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<CanonicalValue>),
    Object(BTreeMap<String, CanonicalValue>),
}

impl CanonicalValue {
    fn from_json_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CanonicalValue::Null,
            serde_json::Value::Bool(b) => CanonicalValue::Bool(*b),
            serde_json::Value::Number(n) => CanonicalValue::Number(float_normalize(n.as_f64().unwrap_or(0.0))),
            serde_json::Value::String(s) => CanonicalValue::String(s.clone()),
            serde_json::Value::Array(arr) => CanonicalValue::Array(arr.iter().map(Self::from_json_value).collect()),
            serde_json::Value::Object(obj) => {
                CanonicalValue::Object(obj.iter().map(|(k, v)| (k.clone(), Self::from_json_value(v))).collect())
            }
        }
    }
}

/// Serializes `value` to canonical JSON bytes: sorted object keys,
/// normalized floats, no trailing whitespace.
#[must_use]
pub fn canonical_json<T: Serialize>(value: &T) -> Vec<u8> {
    let json_value = serde_json::to_value(value).expect("serialization failed");
    let canonical = CanonicalValue::from_json_value(&json_value);
    let mut bytes = serde_json::to_vec(&canonical).expect("canonical serialization failed");
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    bytes
}

/// Hex-encoded SHA-256 of `bytes`.
#[must_use]
pub fn stable_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Canonical-JSON-then-hash in one call.
#[must_use]
pub fn compute_fingerprint<T: Serialize>(value: &T) -> Fingerprint {
    stable_hash(&canonical_json(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    #[allow(clippy::float_cmp)]
    fn float_normalize_eliminates_floating_point_noise() {
        let sum = 0.1 + 0.2;
        assert!((float_normalize(sum) - 0.3).abs() < 1e-9);
        assert_eq!(float_normalize(f64::NAN), 0.0);
        assert_eq!(float_normalize(f64::INFINITY), f64::MAX);
        assert_eq!(float_normalize(f64::NEG_INFINITY), f64::MIN);
    }

    #[test]
    fn canonical_json_is_independent_of_field_order() {
        let v1 = json!({"z": 1, "a": 2, "m": 3});
        let v2 = json!({"a": 2, "z": 1, "m": 3});
        assert_eq!(canonical_json(&v1), canonical_json(&v2));
    }

    #[test]
    fn stable_hash_is_deterministic_and_64_hex_chars() {
        let hash1 = stable_hash(b"test data");
        let hash2 = stable_hash(b"test data");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert!(hash1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn compute_fingerprint_matches_for_identical_values() {
        let a = json!({"id": "test", "value": 1.0});
        let b = json!({"value": 1.0, "id": "test"});
        assert_eq!(compute_fingerprint(&a), compute_fingerprint(&b));
    }
}
