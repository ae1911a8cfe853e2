//! Integration tests for the persistence stores.

use std::path::PathBuf;

use fison_io::{DirectoryStore, NullStore, SolutionStore, StoreSummary};
use fison_mesh::generators::{fluid_channel, structure_strip};
use fison_physics::{DofCounts, SolutionState};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fison_io_{name}_{}", std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    dir
}

fn sample_state() -> SolutionState {
    let fluid = fluid_channel(2, 1, 2.0, 1.0);
    let structure = structure_strip(2, 1, 2.0, 0.25);
    SolutionState::zeros(&fluid, &structure)
}

// ─────────────────────────── DirectoryStore ───────────────────────────

#[test]
fn round_trip_through_summary() {
    let dir = scratch_dir("round_trip");
    let mut store = DirectoryStore::create(&dir).unwrap();
    let state = sample_state();

    store.append_state(0.0, &state).unwrap();
    store.append_state(0.1, &state).unwrap();
    store.append_iteration_count(0.1, 4).unwrap();
    store.append_goal(0.1, 2.0, 0.2).unwrap();
    store.write_final_goal(2.0, 0.2).unwrap();
    store
        .save_mesh(0, &fluid_channel(2, 1, 2.0, 1.0))
        .unwrap();
    store
        .save_dof_counts(0, 1, &DofCounts::from_meshes(
            &fluid_channel(2, 1, 2.0, 1.0),
            &structure_strip(2, 1, 2.0, 0.25),
        ))
        .unwrap();

    let summary = StoreSummary::read(&dir).unwrap();
    assert_eq!(summary.states, 2);
    assert_eq!(summary.last_time, Some(0.1));
    assert_eq!(summary.total_iterations, 4);
    assert_eq!(summary.goal_samples, 1);
    assert_eq!(summary.final_goal, Some((2.0, 0.2)));
    assert_eq!(summary.mesh_levels, vec![0]);
    assert_eq!(summary.dof_totals.len(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn summary_of_empty_store_is_empty() {
    let dir = scratch_dir("empty");
    let _store = DirectoryStore::create(&dir).unwrap();

    let summary = StoreSummary::read(&dir).unwrap();
    assert_eq!(summary.states, 0);
    assert_eq!(summary.last_time, None);
    assert_eq!(summary.final_goal, None);
    assert!(summary.mesh_levels.is_empty());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn mesh_snapshots_are_keyed_by_level() {
    let dir = scratch_dir("mesh_levels");
    let mut store = DirectoryStore::create(&dir).unwrap();
    let mesh = fluid_channel(2, 1, 2.0, 1.0);

    store.save_mesh(0, &mesh).unwrap();
    store.save_mesh(1, &mesh).unwrap();
    store.save_mesh(2, &mesh).unwrap();

    let summary = StoreSummary::read(&dir).unwrap();
    assert_eq!(summary.mesh_levels, vec![0, 1, 2]);

    std::fs::remove_dir_all(&dir).unwrap();
}

// ─────────────────────────── NullStore ───────────────────────────

#[test]
fn null_store_accepts_everything() {
    let mut store = NullStore;
    let state = sample_state();
    store.append_state(0.0, &state).unwrap();
    store.append_iteration_count(0.0, 1).unwrap();
    store.append_goal(0.0, 0.0, 0.0).unwrap();
    store.write_final_goal(0.0, 0.0).unwrap();
}
