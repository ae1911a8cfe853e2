//! Integration tests for fison-mesh.

use std::collections::HashSet;

use fison_mesh::generators::{fluid_channel, matched_interface_pairs, structure_strip, unit_square};
use fison_mesh::mesh::TriMesh;
use fison_mesh::refine::{BisectionRefiner, MeshRefiner};
use fison_mesh::topology::Topology;
use fison_mesh::fields::VectorField;

// ─── Mesh / Generator Tests ───────────────────────────────────

#[test]
fn unit_square_counts() {
    let mesh = unit_square(4, 4);
    assert_eq!(mesh.vertex_count(), 25);
    assert_eq!(mesh.cell_count(), 32);
    mesh.validate().unwrap();
}

#[test]
fn unit_square_cells_are_ccw() {
    let mesh = unit_square(3, 5);
    for c in 0..mesh.cell_count() {
        assert!(mesh.cell_area(c) > 0.0, "cell {c} is not CCW");
    }
}

#[test]
fn total_area_is_preserved_by_triangulation() {
    let mesh = fluid_channel(8, 4, 4.0, 1.0);
    let total: f64 = (0..mesh.cell_count()).map(|c| mesh.cell_area(c)).sum();
    assert!((total - 4.0).abs() < 1e-12);
}

#[test]
fn channel_interface_is_bottom_edge() {
    let mesh = fluid_channel(4, 2, 2.0, 1.0);
    let iface = mesh.interface_vertices();
    assert_eq!(iface.len(), 5);
    for &v in &iface {
        assert_eq!(mesh.pos_y[v as usize], 0.0);
    }
    assert!((mesh.interface_length() - 2.0).abs() < 1e-12);
}

#[test]
fn matched_pairs_line_up() {
    let fluid = fluid_channel(6, 3, 3.0, 1.0);
    let solid = structure_strip(6, 2, 3.0, 0.25);
    let pairs = matched_interface_pairs(&fluid, &solid).unwrap();
    assert_eq!(pairs.len(), 7);
    for &(f, s) in &pairs {
        assert!((fluid.pos_x[f as usize] - solid.pos_x[s as usize]).abs() < 1e-12);
    }
}

#[test]
fn mismatched_interfaces_are_rejected() {
    let fluid = fluid_channel(6, 3, 3.0, 1.0);
    let solid = structure_strip(5, 2, 3.0, 0.25);
    assert!(matched_interface_pairs(&fluid, &solid).is_err());
}

#[test]
fn validate_catches_out_of_range_index() {
    let mut mesh = unit_square(2, 2);
    mesh.indices[0] = 999;
    assert!(mesh.validate().is_err());
}

#[test]
fn validate_catches_inverted_cell() {
    let mut mesh = unit_square(2, 2);
    // Swap two indices of the first cell to flip its winding
    mesh.indices.swap(0, 1);
    assert!(mesh.validate().is_err());
}

// ─── Topology Tests ───────────────────────────────────────────

#[test]
fn topology_boundary_detection() {
    let mesh = unit_square(3, 3);
    let topo = Topology::build(&mesh);
    let boundary: Vec<usize> = (0..mesh.vertex_count())
        .filter(|&i| topo.on_boundary[i])
        .collect();
    // 4×4 vertex grid: 12 on the boundary, 4 interior
    assert_eq!(boundary.len(), 12);
}

#[test]
fn topology_neighbor_across() {
    let mesh = unit_square(1, 1);
    let topo = Topology::build(&mesh);
    // Two cells sharing the diagonal
    let [a, b, c] = mesh.cell(0);
    let diagonal = [(a, b), (b, c), (c, a)]
        .into_iter()
        .find(|&(u, v)| topo.neighbor_across(0, u, v).is_some())
        .expect("cells must share an edge");
    assert_eq!(topo.neighbor_across(0, diagonal.0, diagonal.1), Some(1));
}

/// Every edge with a single adjacent cell must be a declared boundary edge
/// — anything else is a hanging node left by refinement.
fn assert_conforming(mesh: &TriMesh) {
    let topo = Topology::build(mesh);
    let declared: HashSet<(u32, u32)> = mesh
        .boundary_edges
        .iter()
        .map(|e| (e.v0.min(e.v1), e.v0.max(e.v1)))
        .collect();
    for (i, cells) in topo.edge_cells.iter().enumerate() {
        let key = (topo.edges[i][0], topo.edges[i][1]);
        match cells.len() {
            1 => assert!(declared.contains(&key), "hanging edge {key:?}"),
            2 => {}
            n => panic!("edge {key:?} has {n} adjacent cells"),
        }
    }
}

// ─── Refinement Tests ─────────────────────────────────────────

#[test]
fn uniform_refinement_quadruples_cells() {
    let mesh = unit_square(2, 2);
    let refiner = BisectionRefiner::default();
    let fine = refiner.refine_uniform(&mesh).unwrap();

    assert_eq!(fine.cell_count(), mesh.cell_count() * 4);
    assert_eq!(fine.generation, mesh.generation + 1);
    fine.validate().unwrap();
    assert_conforming(&fine);

    // Area preserved
    let coarse_area: f64 = (0..mesh.cell_count()).map(|c| mesh.cell_area(c)).sum();
    let fine_area: f64 = (0..fine.cell_count()).map(|c| fine.cell_area(c)).sum();
    assert!((coarse_area - fine_area).abs() < 1e-12);
}

#[test]
fn uniform_refinement_preserves_markers() {
    let mesh = fluid_channel(2, 2, 1.0, 1.0);
    let refiner = BisectionRefiner::default();
    let fine = refiner.refine_uniform(&mesh).unwrap();

    // Interface length unchanged, interface vertex count grows
    assert!((fine.interface_length() - 1.0).abs() < 1e-12);
    assert!(fine.interface_vertices().len() > mesh.interface_vertices().len());
}

#[test]
fn indicator_refinement_targets_marked_cells() {
    let mesh = unit_square(4, 4);
    let refiner = BisectionRefiner::default();

    // Concentrate all error in cell 0
    let mut indicators = vec![0.0; mesh.cell_count()];
    indicators[0] = 1.0;

    let fine = refiner.refine_by_indicators(&mesh, &indicators).unwrap();
    fine.validate().unwrap();
    assert_conforming(&fine);
    assert!(fine.cell_count() > mesh.cell_count());
    // Local refinement: far fewer new cells than uniform would add
    assert!(fine.cell_count() < mesh.cell_count() * 4);
    assert_eq!(fine.generation, mesh.generation + 1);
}

#[test]
fn indicator_refinement_with_zero_error_changes_nothing_but_generation() {
    let mesh = unit_square(3, 3);
    let refiner = BisectionRefiner::default();
    let indicators = vec![0.0; mesh.cell_count()];
    let out = refiner.refine_by_indicators(&mesh, &indicators).unwrap();
    assert_eq!(out.cell_count(), mesh.cell_count());
    assert_eq!(out.generation, mesh.generation + 1);
}

#[test]
fn indicator_refinement_rejects_bad_indicator_length() {
    let mesh = unit_square(2, 2);
    let refiner = BisectionRefiner::default();
    assert!(refiner.refine_by_indicators(&mesh, &[1.0]).is_err());
}

#[test]
fn repeated_indicator_refinement_stays_conforming() {
    let mut mesh = unit_square(2, 2);
    let refiner = BisectionRefiner {
        marking_fraction: 0.3,
    };
    for pass in 0..3 {
        let mut indicators = vec![0.1; mesh.cell_count()];
        // Bias toward the first quarter of the cells
        for v in indicators.iter_mut().take(mesh.cell_count() / 4) {
            *v = 1.0;
        }
        mesh = refiner.refine_by_indicators(&mesh, &indicators).unwrap();
        mesh.validate()
            .unwrap_or_else(|e| panic!("pass {pass}: {e}"));
        assert_conforming(&mesh);
    }
    assert_eq!(mesh.generation, 3);
}

// ─── Field Tests ──────────────────────────────────────────────

#[test]
fn vector_field_difference_norm() {
    let mut a = VectorField::zeros(3);
    let b = VectorField::zeros(3);
    a.x[0] = 3.0;
    a.y[1] = 4.0;
    assert!((a.difference_norm(&b) - 5.0).abs() < 1e-15);
}

#[test]
fn vector_field_copy_from() {
    let mut a = VectorField::zeros(2);
    let mut b = VectorField::zeros(2);
    b.x[1] = 2.5;
    a.copy_from(&b);
    assert_eq!(a, b);
}
