//! Integration tests for drape-solver.

use drape_math::Vec3;
use drape_mesh::generators::{quad_grid, tube};
use drape_mesh::{BoundaryRing, Topology, TriangleMesh};
use drape_solver::constraints::solve_distance;
use drape_solver::integrator::{guard_state, integrate};
use drape_solver::{
    ConstraintSet, DistanceConstraint, InteractionConstraint, PhysicsState, PinRule,
    SimulationConfig,
};
use drape_types::ParticleId;
use proptest::prelude::*;

fn triangle() -> TriangleMesh {
    TriangleMesh {
        pos_x: vec![0.0, 1.0, 0.0],
        pos_y: vec![0.0, 0.0, 1.0],
        pos_z: vec![0.0, 0.0, 0.0],
        indices: vec![0, 1, 2],
    }
}

fn pin_first(n: u32) -> impl Fn(ParticleId, Vec3) -> bool {
    move |id, _| id.0 < n
}

// ─── PhysicsState Tests ───────────────────────────────────────

#[test]
fn state_starts_at_rest() {
    let mesh = quad_grid(4, 4, 1.0, 1.0);
    let state = PhysicsState::initialize(&mesh, |_, _| false).unwrap();
    assert_eq!(state.vertex_count, 25);
    assert_eq!(state.pos_x, state.prev_x);
    assert!((0..25).all(|i| state.velocity(i) == Vec3::ZERO));
    assert_eq!(state.free_count(), 25);
}

#[test]
fn state_pin_predicate_sets_zero_inverse_mass() {
    let mesh = quad_grid(2, 2, 1.0, 1.0);
    let state = PhysicsState::initialize(&mesh, |_, p| p.y > 0.4).unwrap();
    assert_eq!(state.inv_mass[0], 0.0);
    assert_eq!(state.inv_mass[2], 0.0);
    assert_eq!(state.inv_mass[4], 1.0);
    assert!(state.inv_mass.iter().all(|&w| w >= 0.0));
}

#[test]
fn state_rejects_invalid_mesh() {
    let mut mesh = triangle();
    mesh.pos_x[0] = f32::INFINITY;
    assert!(PhysicsState::initialize(&mesh, |_, _| false).is_err());

    let mut mesh = triangle();
    mesh.indices.clear();
    assert!(PhysicsState::initialize(&mesh, |_, _| false).is_err());
}

#[test]
fn sync_to_interleaves_positions() {
    let state = PhysicsState::initialize(&triangle(), |_, _| false).unwrap();
    let mut out = vec![0.0; 9];
    state.sync_to(&mut out).unwrap();
    assert_eq!(out, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    assert_eq!(state.positions_interleaved(), out);
}

#[test]
fn sync_to_rejects_wrong_length() {
    let state = PhysicsState::initialize(&triangle(), |_, _| false).unwrap();
    let mut out = vec![0.0; 8];
    assert!(state.sync_to(&mut out).is_err());
}

// ─── Integrator Tests ─────────────────────────────────────────

#[test]
fn integrate_applies_gravity() {
    let mut state = PhysicsState::initialize(&triangle(), |_, _| false).unwrap();
    let dt = 0.01;
    integrate(&mut state, dt, Vec3::new(0.0, -9.81, 0.0), 0.97, 3.0);
    let expected = -9.81 * dt * dt;
    assert!((state.pos_y[0] - expected).abs() < 1e-7);
    assert_eq!(state.prev_y[0], 0.0);
}

#[test]
fn integrate_skips_pinned() {
    let mut state = PhysicsState::initialize(&triangle(), pin_first(1)).unwrap();
    for _ in 0..10 {
        integrate(&mut state, 0.01, Vec3::new(0.0, -9.81, 0.0), 0.97, 3.0);
    }
    assert_eq!(state.position(0), Vec3::ZERO);
    assert!(state.pos_y[1] < 0.0);
}

#[test]
fn integrate_clamps_speed() {
    let mut state = PhysicsState::initialize(&triangle(), |_, _| false).unwrap();
    state.set_prev_position(0, Vec3::new(-1.0, 0.0, 0.0));
    let dt = 0.01;
    integrate(&mut state, dt, Vec3::ZERO, 1.0, 3.0);
    assert!((state.velocity(0).length() - 3.0 * dt).abs() < 1e-6);
}

#[test]
fn integrate_applies_drag() {
    let mut state = PhysicsState::initialize(&triangle(), |_, _| false).unwrap();
    state.set_prev_position(1, Vec3::new(0.99, 0.0, 0.0));
    integrate(&mut state, 0.01, Vec3::ZERO, 0.5, 0.0);
    assert!((state.velocity(1).x - 0.005).abs() < 1e-6);
}

#[test]
fn guard_resets_runaway_particles() {
    let mut state = PhysicsState::initialize(&triangle(), |_, _| false).unwrap();
    state.set_position(1, Vec3::new(f32::NAN, 0.0, 0.0));
    state.set_position(2, Vec3::new(0.0, 500.0, 0.0));
    let reset = guard_state(&mut state, 50.0);
    assert_eq!(reset, vec![ParticleId(1), ParticleId(2)]);
    assert_eq!(state.position(1), Vec3::X);
    assert_eq!(state.velocity(2), Vec3::ZERO);
    assert!(state.is_finite());
}

proptest! {
    #[test]
    fn guard_always_leaves_bounded_state(x in -1.0e6f32..1.0e6, y in -1.0e6f32..1.0e6) {
        let mut state = PhysicsState::initialize(&triangle(), |_, _| false).unwrap();
        state.set_position(0, Vec3::new(x, y, 0.0));
        guard_state(&mut state, 50.0);
        prop_assert!(state.is_finite());
        prop_assert!(state.max_abs_coordinate() <= 50.0);
    }
}

// ─── Constraint Tests ─────────────────────────────────────────

#[test]
fn structural_constraints_converge_to_rest_length() {
    let mesh = triangle();
    let topo = Topology::build(&mesh);
    let mut state = PhysicsState::initialize(&mesh, pin_first(2)).unwrap();
    let set = ConstraintSet::build(&topo, &state, &BoundaryRing::default());
    assert_eq!(set.structural.len(), 3);

    state.set_position(2, Vec3::new(0.5, 3.0, 0.0));
    for _ in 0..200 {
        set.solve_structural(&mut state, 0.0, 0.001);
    }
    let d02 = (state.position(2) - state.position(0)).length();
    let d12 = (state.position(2) - state.position(1)).length();
    assert!((d02 - 1.0).abs() < 1e-4, "d02 = {}", d02);
    assert!((d12 - 2.0_f32.sqrt()).abs() < 1e-4, "d12 = {}", d12);
    assert_eq!(state.position(0), Vec3::ZERO);
    assert_eq!(state.position(1), Vec3::X);
}

#[test]
fn compliance_softens_correction() {
    let mut state = PhysicsState::initialize(&triangle(), pin_first(1)).unwrap();
    let c = DistanceConstraint::at_rest(&state, 0, 1);
    state.set_position(1, Vec3::new(2.0, 0.0, 0.0));
    // α = 1e-3 / 0.01² = 10, so a unit-weight pair corrects 1/11 of the error.
    solve_distance(&[c], &mut state, 1.0e-3, 0.01);
    assert!((state.pos_x[1] - (2.0 - 1.0 / 11.0)).abs() < 1e-5);
}

#[test]
fn pinned_pairs_are_skipped() {
    let mut state = PhysicsState::initialize(&triangle(), |_, _| true).unwrap();
    let c = DistanceConstraint { a: 0, b: 1, rest_length: 0.5 };
    solve_distance(&[c], &mut state, 0.0, 0.01);
    assert_eq!(state.position(1), Vec3::X);
}

#[test]
fn coincident_particles_are_skipped() {
    let mut state = PhysicsState::initialize(&triangle(), |_, _| false).unwrap();
    state.set_position(1, Vec3::ZERO);
    let c = DistanceConstraint { a: 0, b: 1, rest_length: 1.0 };
    solve_distance(&[c], &mut state, 0.0, 0.01);
    assert!(state.is_finite());
}

#[test]
fn bending_restores_diagonal() {
    let mesh = quad_grid(1, 1, 1.0, 1.0);
    let topo = Topology::build(&mesh);
    let mut state = PhysicsState::initialize(&mesh, pin_first(1)).unwrap();
    let set = ConstraintSet::build(&topo, &state, &BoundaryRing::default());
    assert_eq!(set.bending.len(), 1);
    let rest = set.bending[0].rest_length;

    state.set_position(3, state.position(3) * 2.0);
    set.solve_bending(&mut state, 0.0, 0.01);
    let d = (state.position(3) - state.position(0)).length();
    assert!((d - rest).abs() < 1e-5);
}

#[test]
fn stretch_limit_clamps_overstretched_edge() {
    let mesh = triangle();
    let topo = Topology::build(&mesh);
    let mut state = PhysicsState::initialize(&mesh, pin_first(1)).unwrap();
    let set = ConstraintSet::build(&topo, &state, &BoundaryRing::default());

    state.set_position(1, Vec3::new(3.0, 0.0, 0.0));
    set.enforce_stretch_limits(&mut state, 1.15, 1.05);
    assert!((state.position(1).length() - 1.15).abs() < 1e-5);
}

#[test]
fn collar_edges_use_tighter_limit() {
    let mesh = triangle();
    let topo = Topology::build(&mesh);
    let ring = topo.detect_boundary_ring(&mesh, 10.0);
    assert_eq!(ring.len(), 3);
    let mut state = PhysicsState::initialize(&mesh, pin_first(1)).unwrap();
    let set = ConstraintSet::build(&topo, &state, &ring);
    assert_eq!(set.collar_edge_count(), 3);

    state.set_position(1, Vec3::new(3.0, 0.0, 0.0));
    set.enforce_stretch_limits(&mut state, 1.15, 1.05);
    assert!((state.position(1).length() - 1.05).abs() < 1e-5);
}

// ─── Interaction Tests ────────────────────────────────────────

fn grid_state() -> PhysicsState {
    PhysicsState::initialize(&quad_grid(10, 10, 1.0, 1.0), |id, _| id.0 == 0).unwrap()
}

#[test]
fn grabbing_pinned_particle_is_noop() {
    let state = grid_state();
    let mut grab = InteractionConstraint::new();
    assert!(!grab.begin(&state, ParticleId(0), Vec3::ZERO, 0.0));
    assert!(!grab.is_active());
}

#[test]
fn grabbing_out_of_range_is_noop() {
    let state = grid_state();
    let mut grab = InteractionConstraint::new();
    assert!(!grab.begin(&state, ParticleId(10_000), Vec3::ZERO, 0.0));
}

#[test]
fn ending_while_idle_is_noop() {
    let mut state = grid_state();
    let before = state.clone();
    let mut grab = InteractionConstraint::new();
    assert!(grab.end(&mut state, Some(Vec3::X), 3.0, 0.001).is_none());
    assert_eq!(state.prev_x, before.prev_x);
}

#[test]
fn pull_moves_member_toward_target() {
    let mut state = grid_state();
    let mut grab = InteractionConstraint::new();
    let target = state.position(60) + Vec3::new(0.0, 0.0, 0.2);
    assert!(grab.begin(&state, ParticleId(60), target, 0.0));
    assert_eq!(grab.members().len(), 1);

    let mut last = (state.position(60) - target).length();
    for _ in 0..20 {
        grab.solve(&mut state, 1.0e-7, 0.0008);
        let d = (state.position(60) - target).length();
        assert!(d <= last + 1e-6);
        last = d;
    }
    assert!(last < 1e-3);
}

#[test]
fn area_grab_captures_neighbors_with_offsets() {
    let state = grid_state();
    let mut grab = InteractionConstraint::new();
    let center = state.position(60);
    assert!(grab.begin(&state, ParticleId(60), center, 0.15));
    let members = grab.members();
    assert!(members.len() > 1);
    for m in members {
        let expected = state.position(m.particle.index()) - center;
        assert!((m.offset - expected).length() < 1e-6);
        assert!(m.offset.length() <= 0.15 + 1e-6);
    }
}

#[test]
fn regrab_replaces_current_grab() {
    let state = grid_state();
    let mut grab = InteractionConstraint::new();
    assert!(grab.begin(&state, ParticleId(40), Vec3::ZERO, 0.0));
    assert!(grab.begin(&state, ParticleId(70), Vec3::ONE, 0.0));
    assert_eq!(grab.anchor(), Some(ParticleId(70)));
    assert_eq!(grab.record().particle, 70);
    assert_eq!(grab.target(), Some(Vec3::ONE));
}

#[test]
fn release_clamps_throw_speed() {
    let mut state = grid_state();
    let mut grab = InteractionConstraint::new();
    let p = state.position(55);
    grab.begin(&state, ParticleId(55), p, 0.0);
    let dt = 0.0008;
    let applied = grab.end(&mut state, Some(Vec3::new(10.0, 0.0, 0.0)), 3.0, dt).unwrap();
    assert!((applied.length() - 3.0).abs() < 1e-5);
    assert!(!grab.is_active());
    assert!((state.velocity(55).x - 3.0 * dt).abs() < 1e-6);
}

#[test]
fn release_uses_target_motion_without_hint() {
    let mut state = grid_state();
    let mut grab = InteractionConstraint::new();
    let p = state.position(55);
    grab.begin(&state, ParticleId(55), p, 0.0);
    grab.advance(0.05);
    grab.update_target(p + Vec3::new(0.1, 0.0, 0.0));
    let v = grab.estimated_velocity();
    assert!((v.x - 2.0).abs() < 1e-3, "estimate {:?}", v);

    grab.end(&mut state, None, 3.0, 0.01);
    assert!((state.velocity(55).x - 0.02).abs() < 1e-4);
}

#[test]
fn release_after_holding_still_has_no_throw() {
    let mut state = grid_state();
    let mut grab = InteractionConstraint::new();
    let p = state.position(55);
    grab.begin(&state, ParticleId(55), p, 0.0);
    for k in 1..=5 {
        grab.update_target(p + Vec3::new(0.05 * k as f32, 0.0, 0.0));
        grab.advance(0.016);
    }
    assert!(grab.estimated_velocity().length() > 1.0);

    // Two seconds without a single target update.
    for _ in 0..125 {
        grab.advance(0.016);
    }
    assert_eq!(grab.estimated_velocity(), Vec3::ZERO);

    let applied = grab.end(&mut state, None, 3.0, 0.01).unwrap();
    assert_eq!(applied, Vec3::ZERO);
    assert!(state.velocity(55).length() < 1e-6);
}

#[test]
fn throw_estimate_ignores_motion_before_window() {
    let state = grid_state();
    let mut grab = InteractionConstraint::new();
    let p = state.position(55);
    grab.begin(&state, ParticleId(55), p, 0.0);
    // Fast drag along x, then a slow drag along z.
    for k in 1..=10 {
        grab.update_target(p + Vec3::new(0.1 * k as f32, 0.0, 0.0));
        grab.advance(0.016);
    }
    let turn = p + Vec3::new(1.0, 0.0, 0.0);
    for k in 1..=20 {
        grab.update_target(turn + Vec3::new(0.0, 0.0, 0.008 * k as f32));
        grab.advance(0.016);
    }
    let v = grab.estimated_velocity();
    assert!(v.x.abs() < 1e-3, "stale x motion leaked into {:?}", v);
    assert!((v.z - 0.5).abs() < 0.05, "estimate {:?}", v);
}

#[test]
fn record_is_idle_by_default() {
    let record = InteractionConstraint::new().record();
    assert!(!record.active);
}

// ─── Config Tests ─────────────────────────────────────────────

#[test]
fn default_and_presets_validate() {
    assert!(SimulationConfig::default().validate().is_ok());
    assert!(SimulationConfig::preview().validate().is_ok());
    assert!(SimulationConfig::high_quality().validate().is_ok());
}

#[test]
fn config_rejects_bad_values() {
    let bad = [
        SimulationConfig { substeps: 0, ..Default::default() },
        SimulationConfig { max_frame_dt: 0.0, ..Default::default() },
        SimulationConfig { friction: 1.5, ..Default::default() },
        SimulationConfig { structural_compliance: -1.0, ..Default::default() },
        SimulationConfig { rescue_offset: 0.001, ..Default::default() },
        SimulationConfig { stretch_limit: 0.9, ..Default::default() },
        SimulationConfig { safety_bound: f32::NAN, ..Default::default() },
        SimulationConfig { safety_bound: f32::INFINITY, ..Default::default() },
        SimulationConfig { max_frame_dt: f32::INFINITY, ..Default::default() },
        SimulationConfig { max_speed: f32::NAN, ..Default::default() },
        SimulationConfig { max_throw_speed: f32::NAN, ..Default::default() },
        SimulationConfig { max_speed: f32::INFINITY, ..Default::default() },
    ];
    for config in bad {
        assert!(config.validate().is_err(), "{:?} should be rejected", config);
    }
}

#[test]
fn config_json_roundtrip_and_partial() {
    let config = SimulationConfig {
        floor_height: Some(0.0),
        ..SimulationConfig::high_quality()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: SimulationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let partial: SimulationConfig = serde_json::from_str(r#"{"substeps": 5}"#).unwrap();
    assert_eq!(partial.substeps, 5);
    assert_eq!(partial.drag, SimulationConfig::default().drag);
}

// ─── Pin Rule Tests ───────────────────────────────────────────

#[test]
fn pin_rules_resolve_to_masks() {
    let mesh = tube(0.2, 0.6, 8, 4, 1.0);
    let ring = Topology::build(&mesh).detect_boundary_ring(&mesh, 0.05);
    let n = mesh.vertex_count();

    assert!(PinRule::None.mask(&mesh, &ring).iter().all(|&p| !p));
    assert!(PinRule::All.mask(&mesh, &ring).iter().all(|&p| p));

    let above = PinRule::AboveHeight { height: 1.59 }.mask(&mesh, &ring);
    assert_eq!(above.iter().filter(|&&p| p).count(), 8);

    let collar = PinRule::Collar.mask(&mesh, &ring);
    assert_eq!(collar, above);

    let neck = PinRule::NeckRegion { min_height: 1.5, max_abs_x: 0.1 }.mask(&mesh, &ring);
    assert!(neck.iter().filter(|&&p| p).count() < 8);

    let explicit = PinRule::Indices { indices: vec![0, 3, n as u32 + 5] }.mask(&mesh, &ring);
    assert_eq!(explicit.iter().filter(|&&p| p).count(), 2);
}

#[test]
fn pin_rule_serde_tagged() {
    let rule: PinRule = serde_json::from_str(r#"{"rule":"above_height","height":1.2}"#).unwrap();
    assert_eq!(rule, PinRule::AboveHeight { height: 1.2 });
    let json = serde_json::to_string(&PinRule::Collar).unwrap();
    assert_eq!(json, r#"{"rule":"collar"}"#);
}
