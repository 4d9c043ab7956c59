//! Integration tests for drape-contact.

use drape_contact::body::{FLAG_CONTACT, FLAG_NONE, FLAG_RESCUED};
use drape_contact::spatial_hash::next_prime;
use drape_contact::{
    BodyCollider, FloorPlane, SelfCollisionSystem, SpatialHash, SphereSurface, SurfaceQueryable,
    TriangleBvh,
};
use drape_math::{closest_point_on_triangle, Affine3A, Vec3};
use drape_mesh::generators::{capped_cylinder, quad_grid, uv_sphere};
use drape_mesh::{Topology, TriangleMesh};
use drape_solver::{InsideTest, PhysicsState, SimulationConfig};
use proptest::prelude::*;

fn config() -> SimulationConfig {
    SimulationConfig::default()
}

fn sphere_collider() -> BodyCollider {
    BodyCollider::new(SphereSurface::new(Vec3::ZERO, 0.5), &config())
}

fn brute_force_distance(mesh: &TriangleMesh, p: Vec3) -> f32 {
    (0..mesh.triangle_count())
        .map(|t| {
            let [a, b, c] = mesh.triangle_positions(t);
            (closest_point_on_triangle(p, a, b, c).point - p).length()
        })
        .fold(f32::INFINITY, f32::min)
}

// ─── BVH Tests ────────────────────────────────────────────────

#[test]
fn bvh_builds_over_sphere() {
    let mesh = uv_sphere(0.5, 16, 24);
    let bvh = TriangleBvh::build(&mesh).unwrap();
    assert_eq!(bvh.triangle_count(), mesh.triangle_count());
    assert!(bvh.node_count() > 1);
    let b = bvh.bounds();
    assert!((b.max.y - 0.5).abs() < 1e-5);
    assert_eq!(bvh.name(), "triangle_bvh");
}

#[test]
fn bvh_rejects_fully_degenerate_mesh() {
    let mesh = TriangleMesh {
        pos_x: vec![0.0, 1.0, 2.0],
        pos_y: vec![0.0, 0.0, 0.0],
        pos_z: vec![0.0, 0.0, 0.0],
        indices: vec![0, 1, 2],
    };
    assert!(TriangleBvh::build(&mesh).is_err());
}

#[test]
fn bvh_face_normal_matches_hit_face() {
    let bvh = TriangleBvh::build(&uv_sphere(0.5, 16, 24)).unwrap();
    let hit = bvh.closest_point(Vec3::new(0.3, 0.4, 1.0)).unwrap();
    let normal = bvh.face_normal(hit.face).expect("hit face is kept");
    assert!((normal - hit.normal).length() < 1e-6);
    assert!(bvh.face_normal(drape_types::TriangleId(u32::MAX)).is_none());
}

#[test]
fn bvh_closest_point_has_outward_normal() {
    let bvh = TriangleBvh::build(&uv_sphere(0.5, 16, 24)).unwrap();
    let hit = bvh.closest_point(Vec3::new(0.0, 0.0, 2.0)).unwrap();
    assert!((hit.distance - 1.5).abs() < 0.01);
    assert!(hit.normal.z > 0.9);
}

proptest! {
    #[test]
    fn bvh_matches_brute_force(x in -1.5f32..1.5, y in -1.5f32..1.5, z in -1.5f32..1.5) {
        let mesh = uv_sphere(0.5, 10, 14);
        let bvh = TriangleBvh::build(&mesh).unwrap();
        let p = Vec3::new(x, y, z);
        let hit = bvh.closest_point(p).unwrap();
        prop_assert!((hit.distance - brute_force_distance(&mesh, p)).abs() < 1e-5);
        prop_assert!(((hit.point - p).length() - hit.distance).abs() < 1e-5);
    }
}

#[test]
fn parity_counts_crossings_of_closed_body() {
    let bvh = TriangleBvh::build(&capped_cylinder(0.2, 1.0, 16, 0.0)).unwrap();
    let dir = Vec3::new(0.3, 0.8, 0.5).normalize();
    assert_eq!(bvh.ray_crossings(Vec3::new(0.0, 0.5, 0.0), dir) % 2, 1);
    assert_eq!(bvh.ray_crossings(Vec3::new(1.0, 0.5, 0.0), dir) % 2, 0);
}

#[test]
fn sphere_surface_ray_crossings() {
    let s = SphereSurface::new(Vec3::ZERO, 1.0);
    assert_eq!(s.ray_crossings(Vec3::ZERO, Vec3::X), 1);
    assert_eq!(s.ray_crossings(Vec3::new(-3.0, 0.0, 0.0), Vec3::X), 2);
    assert_eq!(s.ray_crossings(Vec3::new(3.0, 0.0, 0.0), Vec3::X), 0);
}

// ─── Body Collider Tests ──────────────────────────────────────

#[test]
fn inside_particle_is_rescued_with_zero_velocity() {
    let body = sphere_collider();
    let pos = Vec3::new(0.4, 0.0, 0.0);
    let out = body.resolve(pos, pos + Vec3::new(0.01, 0.0, 0.0));
    assert!(out.moved && out.deep);
    assert!((out.position.length() - (0.5 + config().rescue_offset)).abs() < 1e-5);
    assert_eq!(out.position, out.prev_position);
}

#[test]
fn near_particle_is_pushed_to_skin_offset() {
    let body = sphere_collider();
    let skin = config().skin_offset;
    let pos = Vec3::new(0.505, 0.0, 0.0);
    // Moving inward and sideways.
    let prev = pos + Vec3::new(0.002, -0.004, 0.0);
    let out = body.resolve(pos, prev);
    assert!(out.moved && !out.deep);
    assert!((out.position.length() - (0.5 + skin)).abs() < 1e-6);

    let v = out.position - out.prev_position;
    assert!(v.x.abs() < 1e-6, "inward normal velocity must be removed");
    let keep = 1.0 - config().friction;
    assert!((v.y - 0.004 * keep).abs() < 1e-6);
}

#[test]
fn near_particle_moving_outward_keeps_damped_velocity() {
    let body = sphere_collider();
    let pos = Vec3::new(0.505, 0.0, 0.0);
    let prev = pos - Vec3::new(0.002, 0.0, 0.0);
    let out = body.resolve(pos, prev);
    let v = out.position - out.prev_position;
    assert!((v.x - 0.002 * (1.0 - config().friction)).abs() < 1e-6);
}

#[test]
fn distant_particle_is_untouched() {
    let body = sphere_collider();
    let pos = Vec3::new(0.0, 0.7, 0.0);
    let out = body.resolve(pos, pos);
    assert!(!out.moved);
    assert_eq!(out.position, pos);
}

#[test]
fn resolve_point_uses_single_skin_offset() {
    let body = sphere_collider();
    let skin = config().skin_offset;
    let inside = body.resolve_point(Vec3::new(0.0, 0.2, 0.0));
    assert!((inside.length() - (0.5 + skin)).abs() < 1e-5);
    let near = body.resolve_point(Vec3::new(0.0, 0.0, 0.51));
    assert!((near.length() - (0.5 + skin)).abs() < 1e-5);
    let far = Vec3::new(0.0, 0.0, 1.0);
    assert_eq!(body.resolve_point(far), far);
}

#[test]
fn mesh_body_rescues_particle_from_depth() {
    let body = BodyCollider::from_mesh(&uv_sphere(0.5, 24, 32), &config()).unwrap();
    let pos = Vec3::new(0.0, 0.4, 0.0);
    let prev = pos + Vec3::new(0.0, 0.01, 0.0);
    let out = body.resolve(pos, prev);
    assert!(out.deep);
    let prox = body.proximity(out.position).unwrap();
    assert!(!prox.inside);
    assert!(prox.distance >= config().skin_offset - 1e-4);
}

#[test]
fn parity_inside_test_agrees_on_clear_cases() {
    let cfg = SimulationConfig {
        inside_test: InsideTest::Parity,
        ..config()
    };
    let body = BodyCollider::from_mesh(&capped_cylinder(0.2, 1.0, 16, 0.0), &cfg).unwrap();
    assert!(body.proximity(Vec3::new(0.05, 0.5, 0.0)).unwrap().inside);
    assert!(!body.proximity(Vec3::new(0.5, 0.5, 0.0)).unwrap().inside);
}

#[test]
fn transform_moves_body() {
    let mut body = sphere_collider();
    body.set_transform(Affine3A::from_translation(Vec3::new(0.0, 1.0, 0.0)));
    let prox = body.proximity(Vec3::new(0.0, 1.2, 0.0)).unwrap();
    assert!(prox.inside);
    assert!((prox.point - Vec3::new(0.0, 1.5, 0.0)).length() < 1e-5);
    assert!(!body.proximity(Vec3::new(0.0, 0.2, 0.0)).unwrap().inside);
}

#[test]
fn solve_sets_collision_flags() {
    let mesh = TriangleMesh {
        pos_x: vec![0.0, 0.505, 0.0],
        pos_y: vec![0.0, 0.0, 2.0],
        pos_z: vec![0.0, 0.0, 0.0],
        indices: vec![0, 1, 2],
    };
    let mut state = PhysicsState::initialize(&mesh, |_, _| false).unwrap();
    let body = sphere_collider();
    let mut flags = vec![FLAG_NONE; 3];
    let report = body.solve(&mut state, &mut flags);
    assert_eq!(flags, vec![FLAG_RESCUED, FLAG_CONTACT, FLAG_NONE]);
    assert_eq!(report.resolved, 2);
    assert_eq!(report.deep, 1);
}

#[test]
fn solve_skips_pinned_particles() {
    let mesh = TriangleMesh {
        pos_x: vec![0.0, 1.0, 0.0],
        pos_y: vec![0.0, 0.0, 1.0],
        pos_z: vec![0.0, 0.0, 0.0],
        indices: vec![0, 1, 2],
    };
    let mut state = PhysicsState::initialize(&mesh, |id, _| id.0 == 0).unwrap();
    let mut flags = vec![FLAG_NONE; 3];
    sphere_collider().solve(&mut state, &mut flags);
    assert_eq!(state.position(0), Vec3::ZERO);
}

// ─── Floor Tests ──────────────────────────────────────────────

#[test]
fn floor_lifts_and_damps() {
    let mut mesh = quad_grid(1, 1, 1.0, 1.0);
    mesh.translate(Vec3::new(0.0, 0.6, 0.0));
    let mut state = PhysicsState::initialize(&mesh, |_, _| false).unwrap();
    state.set_prev_position(3, state.position(3) + Vec3::new(-0.02, 0.0, 0.0));
    state.pos_y[3] = -0.05;

    let report = FloorPlane::new(0.0).resolve(&mut state);
    assert_eq!(report.resolved, 1);
    assert!((report.max_correction - 0.05).abs() < 1e-6);
    assert_eq!(state.pos_y[3], 0.0);
    assert_eq!(state.velocity(3).y, 0.0);
    assert!((state.velocity(3).x - 0.01).abs() < 1e-6);
}

// ─── Spatial Hash Tests ───────────────────────────────────────

#[test]
fn table_size_is_prime_and_large_enough() {
    assert_eq!(next_prime(10), 11);
    assert_eq!(next_prime(2), 2);
    assert_eq!(next_prime(0), 2);
    let hash = SpatialHash::new(100, 0.01);
    assert_eq!(hash.table_size(), 211);
}

#[test]
fn hash_query_finds_neighbors() {
    let mesh = quad_grid(10, 10, 0.1, 0.1);
    let state = PhysicsState::initialize(&mesh, |_, _| false).unwrap();
    let mut hash = SpatialHash::new(state.vertex_count, 0.01);
    hash.rebuild(&state);

    let mut out = Vec::new();
    hash.query(state.position(60), 0.011, &mut out);
    for j in [49u32, 59, 60, 61, 71] {
        assert!(out.contains(&j), "missing neighbor {}", j);
    }
    assert!(out.windows(2).all(|w| w[0] < w[1]));
}

// ─── Self-Collision Tests ─────────────────────────────────────

fn two_triangles(gap: f32) -> TriangleMesh {
    TriangleMesh {
        pos_x: vec![0.0, 1.0, 0.0, 0.0, 2.0, 2.0],
        pos_y: vec![0.0, 0.0, 1.0, 1.0, 2.0, 3.0],
        pos_z: vec![0.0, 0.0, 0.0, gap, 0.0, 0.0],
        indices: vec![0, 1, 2, 3, 4, 5],
    }
}

#[test]
fn close_particles_are_separated_with_fixed_center_of_mass() {
    let mesh = two_triangles(0.004);
    let topo = Topology::build(&mesh);
    let mut state = PhysicsState::initialize(&mesh, |_, _| false).unwrap();
    let center = (state.position(2) + state.position(3)) * 0.5;

    let mut system = SelfCollisionSystem::new(&topo, 0.01, 1.0);
    let report = system.solve(&mut state);
    assert_eq!(report.resolved, 1);

    let d = (state.position(2) - state.position(3)).length();
    assert!(d >= 0.01 - 1e-6, "separation {}", d);
    let new_center = (state.position(2) + state.position(3)) * 0.5;
    assert!((new_center - center).length() < 1e-6);
}

#[test]
fn partial_stiffness_corrects_fraction() {
    let mesh = two_triangles(0.004);
    let topo = Topology::build(&mesh);
    let mut state = PhysicsState::initialize(&mesh, |_, _| false).unwrap();
    SelfCollisionSystem::new(&topo, 0.01, 0.25).solve(&mut state);
    let d = (state.position(2) - state.position(3)).length();
    assert!((d - (0.004 + 0.006 * 0.25)).abs() < 1e-6);
}

#[test]
fn pinned_side_does_not_move() {
    let mesh = two_triangles(0.004);
    let topo = Topology::build(&mesh);
    let mut state = PhysicsState::initialize(&mesh, |id, _| id.0 == 2).unwrap();
    SelfCollisionSystem::new(&topo, 0.01, 1.0).solve(&mut state);
    assert_eq!(state.position(2), Vec3::new(0.0, 1.0, 0.0));
    assert!((state.pos_z[3] - 0.01).abs() < 1e-6);
}

#[test]
fn edge_neighbors_are_excluded() {
    let mesh = TriangleMesh {
        pos_x: vec![0.0, 0.005, 0.0],
        pos_y: vec![0.0, 0.0, 1.0],
        pos_z: vec![0.0, 0.0, 0.0],
        indices: vec![0, 1, 2],
    };
    let topo = Topology::build(&mesh);
    let mut state = PhysicsState::initialize(&mesh, |_, _| false).unwrap();
    let report = SelfCollisionSystem::new(&topo, 0.01, 1.0).solve(&mut state);
    assert_eq!(report.resolved, 0);
    assert_eq!(state.pos_x[1], 0.005);
}
