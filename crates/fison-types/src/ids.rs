//! Shared identifier types for the coupled solve.

use serde::{Deserialize, Serialize};

/// Which of the three coupled subproblems an adapter wraps.
///
/// The adapters share one capability set and differ only in the physics
/// they delegate to, so the distinction is a tag, not a type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubproblemKind {
    /// The fluid subproblem (velocity, pressure on the moving domain).
    Fluid,
    /// The deforming solid subproblem (displacement, pressure).
    Structure,
    /// The mesh-motion subproblem (domain displacement).
    Mesh,
}

impl std::fmt::Display for SubproblemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubproblemKind::Fluid => write!(f, "fluid"),
            SubproblemKind::Structure => write!(f, "structure"),
            SubproblemKind::Mesh => write!(f, "mesh"),
        }
    }
}
