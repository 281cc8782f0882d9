use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizerError {
    #[error("failed to build argumentation framework: {0}")]
    FrameworkConstruction(#[from] extension_solver::SolverError),
}
