//! Error types for the Fison coupling engine.
//!
//! All crates return `FisonResult<T>` from fallible operations.
//! There are exactly two fatal categories in the coupling core: a physics
//! engine failing its solve, and the fixed-point coupling loop exhausting
//! its iteration budget. Everything else is data or configuration validation.

use thiserror::Error;

use crate::ids::SubproblemKind;

/// Unified error type for the Fison engine.
#[derive(Debug, Error)]
pub enum FisonError {
    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Problem definition is inconsistent (meshes, dof maps, parameters).
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// A linear-algebra kernel failed (singular system, bad dimensions).
    #[error("Numerics error: {0}")]
    Numerics(String),

    /// A physics engine failed its solve. Fatal — the run aborts.
    #[error("{subproblem} engine failed at t = {time}: {message}")]
    EngineFailure {
        subproblem: SubproblemKind,
        time: f64,
        message: String,
    },

    /// The fixed-point coupling loop exhausted its iteration budget
    /// without satisfying the per-step tolerance. Fatal — the run aborts.
    #[error(
        "Coupling failed to converge at t = {time} after {iterations} iterations \
         (last increment: {last_increment:.3e})"
    )]
    CouplingDivergence {
        time: f64,
        iterations: u32,
        last_increment: f64,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, FisonError>`.
pub type FisonResult<T> = Result<T, FisonError>;
