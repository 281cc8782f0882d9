use thiserror::Error;

/// Errors surfaced by the domain memory store.
///
/// Per the propagation policy, `StoreUnavailable` is the only error this
/// crate raises; callers (the Evidence Normalizer) treat it as a degraded
/// `unknown` reputation rather than failing the whole request.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("domain memory store unavailable: {0}")]
    StoreUnavailable(#[from] std::io::Error),
}
