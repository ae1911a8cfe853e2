//! Tests for fison-types.

use fison_types::{FisonError, SubproblemKind};

#[test]
fn subproblem_kind_display() {
    assert_eq!(SubproblemKind::Fluid.to_string(), "fluid");
    assert_eq!(SubproblemKind::Structure.to_string(), "structure");
    assert_eq!(SubproblemKind::Mesh.to_string(), "mesh");
}

#[test]
fn divergence_error_message_carries_context() {
    let err = FisonError::CouplingDivergence {
        time: 0.25,
        iterations: 100,
        last_increment: 4.2e-2,
    };
    let msg = err.to_string();
    assert!(msg.contains("t = 0.25"));
    assert!(msg.contains("100 iterations"));
    assert!(msg.contains("4.200e-2"));
}

#[test]
fn engine_failure_names_subproblem() {
    let err = FisonError::EngineFailure {
        subproblem: SubproblemKind::Structure,
        time: 1.0,
        message: "singular system".into(),
    };
    assert!(err.to_string().contains("structure"));
}
