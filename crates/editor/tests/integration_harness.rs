//! Integration tests driving whole editing sessions through the harness.

use std::collections::HashSet;

use glam::Vec3;
use quadmesh_editor_lib::fixtures;
use quadmesh_editor_lib::harness::TestHarness;
use quadmesh_editor_lib::mesh::position_key::{key, PositionKey};
use quadmesh_editor_lib::state::EditorSettings;
use shared::{GizmoAxis, GizmoOp, SelectionMode};

fn pos(h: &TestHarness, v: usize) -> Vec3 {
    Vec3::from_array(h.mesh().vertices[v].position)
}

fn boundary_segments(h: &mut TestHarness) -> HashSet<(PositionKey, PositionKey)> {
    let edges: Vec<(u32, u32)> = h
        .session
        .quad_edges()
        .boundary_edges()
        .map(|e| (e.v0, e.v1))
        .collect();
    edges
        .into_iter()
        .map(|(a, b)| {
            let (ka, kb) = (key(pos(h, a as usize)), key(pos(h, b as usize)));
            if ka <= kb { (ka, kb) } else { (kb, ka) }
        })
        .collect()
}

// ── Edge loops ──────────────────────────────────────────────

#[test]
fn test_grid_loop_scenario() {
    let mut h = TestHarness::grid(2, 2);
    assert_eq!(h.vertex_count(), 9);
    assert_eq!(h.triangle_count(), 8);
    assert_eq!(h.quad_count(), 4);

    // vertical edge x=1 between the two bottom cells
    assert!(h.insert_loop_at(1, 4));

    assert_eq!(h.vertex_count(), 12, "three distinct midpoints");
    assert_eq!(h.triangle_count(), 12, "two quads went from 2 to 4 triangles");
    assert_eq!(h.quad_count(), 6);
    assert!(!h.session.selection().has_selection());
    assert!(h.validator().validate_all().is_empty());

    let midpoints: Vec<Vec3> = (9..12).map(|v| pos(&h, v)).collect();
    for expected in [
        Vec3::new(0.0, 0.5, 0.0),
        Vec3::new(1.0, 0.5, 0.0),
        Vec3::new(2.0, 0.5, 0.0),
    ] {
        assert!(
            midpoints.iter().any(|m| (*m - expected).length() < 1e-6),
            "missing midpoint {expected:?}"
        );
    }
}

#[test]
fn test_strip_loop_runs_full_length() {
    let mut h = TestHarness::grid(3, 1);
    assert!(h.insert_loop_at(1, 5));
    assert_eq!(h.vertex_count(), 8 + 4);
    assert_eq!(h.triangle_count(), 12);
    assert_eq!(h.quad_count(), 6);
}

#[test]
fn test_loop_preserves_boundary() {
    let mut h = TestHarness::grid(3, 1);
    let before = boundary_segments(&mut h);
    assert!(h.insert_loop_at(1, 5));
    let after = boundary_segments(&mut h);

    for &(a, b) in &before {
        if after.contains(&(a, b)) {
            continue;
        }
        // a split boundary edge survives as two halves meeting at a new midpoint
        let halves = after
            .iter()
            .filter(|(x, y)| *x == a || *y == a || *x == b || *y == b)
            .count();
        assert!(halves >= 2, "boundary edge {a:?}-{b:?} lost");
    }
    assert_eq!(after.len(), before.len() + 2);
}

#[test]
fn test_loop_on_isolated_quad() {
    let mut h = TestHarness::grid(1, 1);
    assert!(h.insert_loop_at(0, 2));
    assert_eq!(h.vertex_count(), 6);
    assert_eq!(h.quad_count(), 2);
}

#[test]
fn test_loop_needs_edge_selection() {
    let mut h = TestHarness::grid(2, 2);
    assert!(h.select(SelectionMode::Quad, &[0]));
    assert!(!h.session.insert_loop());
    assert_eq!(h.vertex_count(), 9);
    assert!(!h.session.history().can_undo());
}

// ── Extrusion ───────────────────────────────────────────────

#[test]
fn test_extrude_cube_face() {
    let mut h = TestHarness::cube(1.0);
    let quads = h.quad_count();
    assert_eq!(quads, 6);

    assert!(h.extrude_quad(0, 1.0));
    assert_eq!(h.vertex_count(), 24 + 4);
    assert_eq!(h.triangle_count(), 12 - 2 + 10);
    assert_eq!(h.quad_count(), 5 + 4 + 1);
    assert!(h.validator().validate_all().is_empty());
}

#[test]
fn test_extrude_while_extruding_is_ignored() {
    let mut h = TestHarness::grid(2, 1);
    assert!(h.select(SelectionMode::Quad, &[0]));
    assert!(h.session.begin_extrude());
    let vertices = h.vertex_count();

    assert!(h.select(SelectionMode::Quad, &[1]));
    assert!(!h.session.begin_extrude());
    assert_eq!(h.vertex_count(), vertices);
    assert_eq!(h.session.history().undo_count(), 1);
}

#[test]
fn test_extrusion_drag_moves_cap_by_axis() {
    let mut h = TestHarness::grid(1, 1);
    assert!(h.select(SelectionMode::Quad, &[0]));
    assert!(h.session.begin_extrude());
    let moved = h.drag(GizmoOp::Move, Some(GizmoAxis::Z), &[0.25, 0.25]);
    assert_eq!(moved, vec![4, 4]);
    assert!(h.session.end_extrude());

    for v in 4..8 {
        assert!((pos(&h, v).z - 0.5).abs() < 1e-6);
    }
    // the drag is part of the extrusion's single undo step
    assert_eq!(h.session.history().undo_count(), 1);
    assert!(h.undo());
    assert_eq!(h.vertex_count(), 4);
}

#[test]
fn test_extruded_walls_accept_loop() {
    let mut h = TestHarness::grid(1, 1);
    assert!(h.select(SelectionMode::Quad, &[0]));
    assert!(h.session.begin_extrude());
    // read during the drag, as a selection overlay would
    assert_eq!(h.quad_count(), 1);
    h.drag(GizmoOp::Move, Some(GizmoAxis::Z), &[1.0]);
    assert!(h.session.end_extrude());
    assert_eq!(h.quad_count(), 5);

    // vertical edge of a wall: the ring runs around all four walls
    let base = (0..4u32)
        .find(|&v| (pos(&h, v as usize) + Vec3::Z - pos(&h, 4)).length() < 1e-6)
        .unwrap();
    assert!(h.insert_loop_at(base, 4));
    assert_eq!(h.vertex_count(), 8 + 4);
    assert_eq!(h.quad_count(), 9);
    assert!(h.validator().validate_all().is_empty());
}

#[test]
fn test_undo_clears_selection() {
    let mut h = TestHarness::grid(2, 2);
    assert!(h.insert_loop_at(1, 4));
    assert!(h.select(SelectionMode::Quad, &[0]));
    assert!(h.undo());
    assert!(!h.session.selection().has_selection());
    assert!(h.select(SelectionMode::Vertex, &[0]));
    assert!(h.redo());
    assert!(!h.session.selection().has_selection());
}

// ── Transforms ──────────────────────────────────────────────

#[test]
fn test_moving_cube_corner_moves_duplicates() {
    let mut h = TestHarness::cube(2.0);
    let before = h.mesh().clone();
    assert!(h.select(SelectionMode::Vertex, &[0]));
    let corner = pos(&h, 0);
    let moved = h.drag(GizmoOp::Move, Some(GizmoAxis::Y), &[1.0]);
    assert_eq!(moved, vec![3]);

    let target = corner + Vec3::Y;
    let at_target = (0..h.vertex_count())
        .filter(|&v| (pos(&h, v) - target).length() < 1e-6)
        .count();
    assert_eq!(at_target, 3);
    // the other 21 records stayed put
    let untouched = before
        .vertices
        .iter()
        .zip(&h.mesh().vertices)
        .filter(|(a, b)| a.position == b.position)
        .count();
    assert_eq!(untouched, 21);
}

#[test]
fn test_face_selection_moves_three_vertices() {
    let mut h = TestHarness::grid(1, 1);
    assert!(h.select(SelectionMode::Face, &[0]));
    let moved = h.drag(GizmoOp::Move, Some(GizmoAxis::Z), &[0.5]);
    assert_eq!(moved, vec![3]);
}

#[test]
fn test_scale_clamps_to_minimum_factor() {
    let mut h = TestHarness::grid(1, 1);
    assert!(h.select(SelectionMode::Quad, &[0]));
    h.drag(GizmoOp::Scale, None, &[-2.0]);

    let p = pos(&h, 0);
    assert!((p.x - 0.495).abs() < 1e-6);
    assert!((p.y - 0.495).abs() < 1e-6);
}

#[test]
fn test_rotation_increments_compose() {
    let mut stepped = TestHarness::grid(1, 1);
    assert!(stepped.select(SelectionMode::Quad, &[0]));
    let steps = vec![1f32.to_radians(); 45];
    stepped.drag(GizmoOp::Rotate, Some(GizmoAxis::Z), &steps);

    let mut once = TestHarness::grid(1, 1);
    assert!(once.select(SelectionMode::Quad, &[0]));
    once.drag(GizmoOp::Rotate, Some(GizmoAxis::Z), &[45f32.to_radians()]);

    for v in 0..4 {
        assert!((pos(&stepped, v) - pos(&once, v)).length() < 1e-4);
    }
}

#[test]
fn test_move_without_axis_is_noop() {
    let mut h = TestHarness::grid(1, 1);
    let before = h.mesh().clone();
    assert!(h.select(SelectionMode::Quad, &[0]));
    assert_eq!(h.drag(GizmoOp::Move, None, &[1.0]), vec![0]);
    assert_eq!(h.mesh(), &before);
}

#[test]
fn test_drag_uploads_every_frame() {
    let mut h = TestHarness::grid(1, 1);
    assert!(h.select(SelectionMode::Vertex, &[3]));
    h.drag(GizmoOp::Move, Some(GizmoAxis::X), &[0.1, 0.1, 0.1]);
    assert_eq!(h.uploads().len(), 3);
    // moving vertices never rebuilds quad topology
    assert_eq!(h.session.topology_rebuilds(), 1);
}

// ── History ─────────────────────────────────────────────────

#[test]
fn test_undo_restores_exact_arrays() {
    let mut h = TestHarness::grid(2, 2);
    let original = h.mesh().clone();
    assert!(h.insert_loop_at(1, 4));
    let edited = h.mesh().clone();

    assert!(h.undo());
    assert_eq!(h.mesh(), &original);
    assert_eq!(h.quad_count(), 4);

    assert!(h.redo());
    assert_eq!(h.mesh(), &edited);
    assert_eq!(h.quad_count(), 6);
}

#[test]
fn test_undo_on_empty_history() {
    let mut h = TestHarness::grid(1, 1);
    assert!(!h.undo());
    assert!(!h.redo());
}

#[test]
fn test_undo_capacity_from_settings() {
    let settings = EditorSettings {
        undo_capacity: 3,
        ..Default::default()
    };
    let mut h = TestHarness::with_settings(fixtures::grid(1, 1), settings);
    assert!(h.select(SelectionMode::Vertex, &[0]));
    for _ in 0..5 {
        h.drag(GizmoOp::Move, Some(GizmoAxis::Z), &[0.1]);
    }
    assert_eq!(h.session.history().undo_count(), 3);
}

#[test]
fn test_new_edit_clears_redo() {
    let mut h = TestHarness::grid(1, 1);
    assert!(h.select(SelectionMode::Vertex, &[0]));
    h.drag(GizmoOp::Move, Some(GizmoAxis::Z), &[0.1]);
    assert!(h.undo());
    assert!(h.session.history().can_redo());

    assert!(h.select(SelectionMode::Vertex, &[1]));
    h.drag(GizmoOp::Move, Some(GizmoAxis::Z), &[0.1]);
    assert!(!h.session.history().can_redo());
}

// ── Awkward input ───────────────────────────────────────────

#[test]
fn test_folded_pair_has_no_quads() {
    let mut h = TestHarness::new(fixtures::folded_pair());
    assert_eq!(h.quad_count(), 0);
    h.session.set_mode(SelectionMode::Quad);
    assert!(!h.session.toggle_selection(0, false));
}

#[test]
fn test_non_manifold_fan_pairs_once() {
    let mut h = TestHarness::new(fixtures::non_manifold_fan());
    assert_eq!(h.quad_count(), 1);
}

#[test]
fn test_split_seam_blocks_pairing_but_moves_weld() {
    let mut h = TestHarness::new(fixtures::unwelded_grid(2, 1));
    // no two triangles share an index edge
    assert_eq!(h.quad_count(), 0);
    assert_eq!(h.edge_count(), 0);

    // record 1 sits at (1, 0, 0) along with records 6 and 9
    assert!(h.select(SelectionMode::Vertex, &[1]));
    assert_eq!(h.drag(GizmoOp::Move, Some(GizmoAxis::Z), &[0.5]), vec![3]);
    for v in [1, 6, 9] {
        assert!((pos(&h, v) - Vec3::new(1.0, 0.0, 0.5)).length() < 1e-6);
    }
}

#[test]
fn test_normals_recalculated_after_extrusion() {
    let mut h = TestHarness::grid(1, 1);
    assert!(h.extrude_quad(0, 1.0));
    h.clear_selection();
    let updated = h.session.recalculate_normals();
    assert_eq!(updated, 8);
    assert!(h.validator().are_normals_normalized(1e-4));
}
