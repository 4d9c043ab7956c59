//! Procedural mesh generators for benchmarks and testing.
//!
//! Every generator emits counter-clockwise triangles as seen from the
//! side the surface faces, so closed bodies have outward normals.

use std::f32::consts::PI;

use drape_math::Vec3;

use crate::mesh::TriangleMesh;

/// Generates a flat rectangular quad grid in the XY plane, facing +Z.
///
/// The grid spans `[-width/2, width/2]` in X and `[-height/2, height/2]` in Y,
/// rows ordered top to bottom. Hanging-sheet setups pin the top row.
///
/// # Example
/// ```
/// use drape_mesh::generators::quad_grid;
/// let mesh = quad_grid(2, 2, 1.0, 1.0);
/// assert_eq!(mesh.vertex_count(), 9);
/// assert_eq!(mesh.triangle_count(), 8);
/// ```
pub fn quad_grid(cols: usize, rows: usize, width: f32, height: f32) -> TriangleMesh {
    grid(cols, rows, |u, v| {
        Vec3::new(-width / 2.0 + u * width, height / 2.0 - v * height, 0.0)
    })
}

/// Generates a horizontal quad grid in the XZ plane at `elevation`, facing +Y.
///
/// This is the usual "sheet dropped onto a body" setup.
pub fn horizontal_grid(
    cols: usize,
    rows: usize,
    width: f32,
    depth: f32,
    elevation: f32,
) -> TriangleMesh {
    grid(cols, rows, |u, v| {
        Vec3::new(-width / 2.0 + u * width, elevation, -depth / 2.0 + v * depth)
    })
}

/// Shared grid builder. `place(u, v)` maps normalized grid coordinates to
/// a position; rows advance along `v`.
fn grid(cols: usize, rows: usize, place: impl Fn(f32, f32) -> Vec3) -> TriangleMesh {
    let cols = cols.max(1);
    let rows = rows.max(1);
    let verts_x = cols + 1;
    let verts_y = rows + 1;
    let mut mesh = TriangleMesh::with_capacity(verts_x * verts_y, cols * rows * 2);

    for j in 0..verts_y {
        for i in 0..verts_x {
            let u = i as f32 / cols as f32;
            let v = j as f32 / rows as f32;
            mesh.push_vertex(place(u, v));
        }
    }

    for j in 0..rows {
        for i in 0..cols {
            let top_left = (j * verts_x + i) as u32;
            let top_right = top_left + 1;
            let bot_left = top_left + verts_x as u32;
            let bot_right = bot_left + 1;

            mesh.push_triangle(top_left, bot_left, top_right);
            mesh.push_triangle(top_right, bot_left, bot_right);
        }
    }

    mesh
}

/// Generates a UV sphere centered at the origin with outward normals.
///
/// Pole rows collapse to a point, so the zero-area triangles there are
/// skipped. The seam column is duplicated.
pub fn uv_sphere(radius: f32, stacks: usize, slices: usize) -> TriangleMesh {
    let stacks = stacks.max(2);
    let slices = slices.max(3);
    let mut mesh = TriangleMesh::with_capacity((stacks + 1) * (slices + 1), stacks * slices * 2);

    for i in 0..=stacks {
        let phi = PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = 2.0 * PI * j as f32 / slices as f32;
            mesh.push_vertex(
                Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()) * radius,
            );
        }
    }

    for i in 0..stacks {
        for j in 0..slices {
            let a = (i * (slices + 1) + j) as u32;
            let b = a + (slices + 1) as u32;

            if i != 0 {
                mesh.push_triangle(a, a + 1, b);
            }
            if i != stacks - 1 {
                mesh.push_triangle(a + 1, b + 1, b);
            }
        }
    }

    mesh
}

/// Generates an open cylindrical tube around the Y axis, normals outward.
///
/// `rings` is the number of vertical bands; the tube has `rings + 1` vertex
/// rings from `base` up to `base + height`. Both ends stay open, which
/// makes this the simplest garment-like mesh with a collar boundary.
pub fn tube(radius: f32, height: f32, segments: usize, rings: usize, base: f32) -> TriangleMesh {
    let segments = segments.max(3);
    let rings = rings.max(1);
    let mut mesh = TriangleMesh::with_capacity((rings + 1) * segments, rings * segments * 2);

    push_rings(&mut mesh, radius, height, segments, rings, base);
    stitch_rings(&mut mesh, segments, rings);

    mesh
}

/// Generates a closed cylinder (tube plus flat caps) around the Y axis.
///
/// Suitable as a simple body proxy: closed and outward facing.
pub fn capped_cylinder(radius: f32, height: f32, segments: usize, base: f32) -> TriangleMesh {
    let segments = segments.max(3);
    let rings = ((height / radius).ceil() as usize).max(1);
    let mut mesh = TriangleMesh::with_capacity((rings + 1) * segments + 2, (rings + 1) * segments * 2);

    push_rings(&mut mesh, radius, height, segments, rings, base);
    stitch_rings(&mut mesh, segments, rings);

    let bottom = mesh.push_vertex(Vec3::new(0.0, base, 0.0));
    let top = mesh.push_vertex(Vec3::new(0.0, base + height, 0.0));
    let top_ring = (rings * segments) as u32;
    for j in 0..segments {
        let next = (j + 1) % segments;
        mesh.push_triangle(bottom, j as u32, next as u32);
        mesh.push_triangle(top, top_ring + next as u32, top_ring + j as u32);
    }

    mesh
}

fn push_rings(mesh: &mut TriangleMesh, radius: f32, height: f32, segments: usize, rings: usize, base: f32) {
    for k in 0..=rings {
        let y = base + height * k as f32 / rings as f32;
        for j in 0..segments {
            let theta = 2.0 * PI * j as f32 / segments as f32;
            mesh.push_vertex(Vec3::new(radius * theta.cos(), y, radius * theta.sin()));
        }
    }
}

fn stitch_rings(mesh: &mut TriangleMesh, segments: usize, rings: usize) {
    let seg = segments as u32;
    for k in 0..rings as u32 {
        for j in 0..seg {
            let next = (j + 1) % seg;
            let a = k * seg + j;
            let b = k * seg + next;
            let c = a + seg;
            let d = b + seg;
            mesh.push_triangle(a, c, b);
            mesh.push_triangle(b, c, d);
        }
    }
}
