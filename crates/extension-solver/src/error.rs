use thiserror::Error;

/// Errors the Extension Solver can raise.
///
/// `TimeBudgetExceeded` is non-fatal: the solver still returns the grounded
/// extension, with this flagged on the result rather than returned as an
/// `Err`. It is listed here because it is a recognized error *kind* per the
/// error-handling design, even though callers observe it via a result flag.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("invalid argumentation framework: {0}")]
    InvalidFramework(String),
    #[error("solver time budget exceeded")]
    TimeBudgetExceeded,
}
