use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Normalizer(#[from] evidence_normalizer::NormalizerError),
    #[error(transparent)]
    Solver(#[from] extension_solver::SolverError),
    #[error(transparent)]
    Memory(#[from] domain_memory::MemoryError),
    #[error(transparent)]
    Resolver(#[from] resolver::ResolverError),
}
