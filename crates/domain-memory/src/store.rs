//! Append-only persistence and recency-weighted reputation queries.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::MemoryError;
use crate::types::{DomainReputation, KnowledgeEntry, MemoryStats, Outcome, ReputationLabel};

/// One-week half-life, in seconds, used when no override is configured.
pub const DEFAULT_HALFLIFE_SECONDS: u64 = 604_800;

/// Weight floor below which a weight contribution is excluded from
/// `sample_count` (four half-lives old).
const SAMPLE_COUNT_WEIGHT_FLOOR: f64 = 0.0625; // 2^-4

const EPSILON: f64 = 1e-9;

const CLAMPED_FROM_META_KEY: &str = "clamped_from_timestamp";

struct MemoryState {
    entries: Vec<KnowledgeEntry>,
    last_timestamp: u64,
    file: File,
}

/// Durable, append-only, per-domain decision log.
///
/// Concurrency model: a single [`RwLock`] realizes the "exclusive writer,
/// shared readers, no reader blocks another reader" rule from the spec.
/// The writer lock is held only for the duration of append + flush.
pub struct MemoryStore {
    log_path: PathBuf,
    halflife_seconds: u64,
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Opens (creating if absent) the log at `path`, replaying any existing
    /// entries. A partial trailing line (e.g. from a crash mid-write) is
    /// ignored rather than treated as an error.
    pub fn open(path: impl AsRef<Path>, halflife_seconds: u64) -> Result<Self, MemoryError> {
        let log_path = path.as_ref().to_path_buf();
        let entries = Self::load(&log_path)?;
        let last_timestamp = entries.iter().map(|e| e.timestamp).max().unwrap_or(0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing::debug!(
            path = %log_path.display(),
            loaded = entries.len(),
            "domain memory store opened"
        );

        Ok(Self {
            log_path,
            halflife_seconds,
            state: RwLock::new(MemoryState {
                entries,
                last_timestamp,
                file,
            }),
        })
    }

    fn load(path: &Path) -> Result<Vec<KnowledgeEntry>, MemoryError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MemoryError::StoreUnavailable(e)),
        };
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<KnowledgeEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(_) => {
                    // Partial or corrupt trailing line: ignore per the
                    // persistence format contract, don't fail the load.
                    tracing::warn!(path = %path.display(), "ignoring unparseable log line");
                }
            }
        }
        Ok(entries)
    }

    /// Appends `entry`, clamping a regressed timestamp to the last observed
    /// one and recording the clamp in `meta`. Durable on return: the line is
    /// flushed and fsynced before `store` returns `Ok`.
    pub fn store(&self, mut entry: KnowledgeEntry) -> Result<(), MemoryError> {
        let mut state = self.state.write().expect("domain memory lock poisoned");

        if entry.timestamp < state.last_timestamp {
            entry
                .meta
                .insert(CLAMPED_FROM_META_KEY.to_string(), entry.timestamp.to_string());
            entry.timestamp = state.last_timestamp;
        }

        let line = serde_json::to_string(&entry).map_err(|e| {
            MemoryError::StoreUnavailable(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        state.file.write_all(line.as_bytes())?;
        state.file.write_all(b"\n")?;
        state.file.flush()?;
        state.file.sync_data()?;

        state.last_timestamp = entry.timestamp;
        tracing::debug!(domain = %entry.domain, outcome = ?entry.outcome, "stored decision observation");
        state.entries.push(entry);

        Ok(())
    }

    /// Entries for `domain`, most recent first, optionally filtered by a
    /// minimum timestamp and bounded by `limit`.
    #[must_use]
    pub fn query(&self, domain: &str, since: Option<u64>, limit: Option<usize>) -> Vec<KnowledgeEntry> {
        let state = self.state.read().expect("domain memory lock poisoned");
        let mut matched: Vec<KnowledgeEntry> = state
            .entries
            .iter()
            .rev()
            .filter(|e| e.domain == domain)
            .filter(|e| since.is_none_or(|s| e.timestamp >= s))
            .cloned()
            .collect();
        if let Some(limit) = limit {
            matched.truncate(limit);
        }
        matched
    }

    /// Computes the recency-weighted reputation of `domain` as of `now`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reputation(&self, domain: &str, now: u64) -> DomainReputation {
        let state = self.state.read().expect("domain memory lock poisoned");
        let halflife = self.halflife_seconds as f64;

        let mut w_allow = 0.0_f64;
        let mut w_deny = 0.0_f64;
        let mut w_modify = 0.0_f64;
        let mut sample_count = 0_usize;
        let mut last_seen: Option<u64> = None;

        for entry in state.entries.iter().filter(|e| e.domain == domain) {
            let age = (now.saturating_sub(entry.timestamp)) as f64;
            let weight = 2f64.powf(-age / halflife);
            match entry.outcome {
                Outcome::Allow => w_allow += weight,
                Outcome::Deny => w_deny += weight,
                Outcome::Modify => w_modify += weight,
            }
            if weight > SAMPLE_COUNT_WEIGHT_FLOOR {
                sample_count += 1;
            }
            last_seen = Some(last_seen.map_or(entry.timestamp, |l| l.max(entry.timestamp)));
        }

        let total = w_allow + w_deny + w_modify;
        if total < EPSILON {
            return DomainReputation {
                domain: domain.to_string(),
                score: 0.0,
                label: ReputationLabel::Unknown,
                sample_count: 0,
                last_seen,
            };
        }

        let score = (w_allow - w_deny + 0.5 * w_modify) / total;
        let label = if score >= 0.5 && sample_count >= 3 {
            ReputationLabel::Trusted
        } else if score <= -0.3 {
            ReputationLabel::Suspicious
        } else {
            ReputationLabel::Mixed
        };

        DomainReputation {
            domain: domain.to_string(),
            score,
            label,
            sample_count,
            last_seen,
        }
    }

    /// Aggregate counters over the whole store.
    #[must_use]
    pub fn stats(&self) -> MemoryStats {
        let state = self.state.read().expect("domain memory lock poisoned");
        let distinct_domains = state
            .entries
            .iter()
            .map(|e| e.domain.as_str())
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        MemoryStats {
            total_entries: state.entries.len(),
            distinct_domains,
            oldest_timestamp: state.entries.iter().map(|e| e.timestamp).min(),
            newest_timestamp: state.entries.iter().map(|e| e.timestamp).max(),
        }
    }

    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;
    use std::collections::BTreeMap;

    fn entry(domain: &str, outcome: Outcome, timestamp: u64) -> KnowledgeEntry {
        KnowledgeEntry {
            domain: domain.to_string(),
            outcome,
            matched_rules: vec![],
            timestamp,
            meta: BTreeMap::new(),
        }
    }

    #[test]
    fn append_durability_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.log");

        {
            let store = MemoryStore::open(&path, DEFAULT_HALFLIFE_SECONDS).unwrap();
            store.store(entry("example.com", Outcome::Allow, 100)).unwrap();
            assert_eq!(store.query("example.com", None, None).len(), 1);
        }

        let reopened = MemoryStore::open(&path, DEFAULT_HALFLIFE_SECONDS).unwrap();
        let observed = reopened.query("example.com", None, None);
        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].timestamp, 100);
    }

    #[test]
    fn timestamp_regression_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path().join("memory.log"), DEFAULT_HALFLIFE_SECONDS).unwrap();

        store.store(entry("example.com", Outcome::Allow, 500)).unwrap();
        store.store(entry("example.com", Outcome::Deny, 100)).unwrap();

        let observed = store.query("example.com", None, None);
        assert_eq!(observed[0].timestamp, 500);
        assert!(observed[0].meta.contains_key(CLAMPED_FROM_META_KEY));
    }

    #[test]
    fn reputation_decay_law_single_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path().join("memory.log"), DEFAULT_HALFLIFE_SECONDS).unwrap();
        store.store(entry("example.com", Outcome::Allow, 0)).unwrap();

        // At age = one half-life, weight should be exactly 0.5, and since
        // this is the only entry, score should equal 1.0 (all allow).
        let rep = store.reputation("example.com", DEFAULT_HALFLIFE_SECONDS);
        assert!((rep.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn reputation_tends_to_unknown_as_age_grows_without_bound() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path().join("memory.log"), DEFAULT_HALFLIFE_SECONDS).unwrap();
        store.store(entry("example.com", Outcome::Allow, 0)).unwrap();

        let rep = store.reputation("example.com", DEFAULT_HALFLIFE_SECONDS * 200);
        assert_eq!(rep.label, ReputationLabel::Unknown);
        assert!((rep.score - 0.0).abs() < 1e-9);
    }

    #[test]
    fn trusted_requires_sample_count_and_score() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path().join("memory.log"), DEFAULT_HALFLIFE_SECONDS).unwrap();
        for t in 0..50 {
            store.store(entry("trusted.com", Outcome::Allow, t)).unwrap();
        }
        let rep = store.reputation("trusted.com", 49);
        assert_eq!(rep.label, ReputationLabel::Trusted);
        assert!(rep.score > 0.9);
    }

    #[test]
    fn stats_reports_distinct_domains_and_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path().join("memory.log"), DEFAULT_HALFLIFE_SECONDS).unwrap();
        store.store(entry("a.com", Outcome::Allow, 10)).unwrap();
        store.store(entry("b.com", Outcome::Deny, 20)).unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.distinct_domains, 2);
        assert_eq!(stats.oldest_timestamp, Some(10));
        assert_eq!(stats.newest_timestamp, Some(20));
    }
}
