//! # Extension Solver
//!
//! Computes the extensions of an abstract argumentation framework (AAF) in
//! the sense of Dung (1995): the unique grounded extension (always), and
//! the families of preferred and stable extensions (best-effort, bounded
//! by a size cap and a wall-clock budget).
//!
//! ## Determinism
//!
//! Identical `(A, R)` inputs produce byte-identical extension orderings:
//! arguments are indexed in sorted-id order, adjacency is represented as
//! word-packed bitsets rather than a pointer graph, and extensions are
//! sorted by descending aggregate strength then lexical id.

pub mod bitset;
pub mod error;
pub mod solver;
pub mod types;

pub use error::SolverError;
pub use solver::{solve, SolverOutput};
pub use types::{
    Argument, ArgumentId, ArgumentKind, ArgumentSource, ArgumentationFramework, Attack, Extension,
    ExtensionKind, SolverConfig,
};
