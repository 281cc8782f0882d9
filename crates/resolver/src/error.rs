use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("no authoritative extension available: grounded is empty and no preferred extension exists")]
    NoAuthoritativeExtension,
}
