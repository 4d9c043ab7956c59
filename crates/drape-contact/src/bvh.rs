//! Bounding volume hierarchy over body triangles.
//!
//! Flat node array in depth-first order: an interior node's left child
//! directly follows it, the right child index is stored. Construction
//! splits at the centroid median along the longest axis of the centroid
//! bounds; leaves hold up to [`LEAF_SIZE`] triangles.
//!
//! Closest-point queries walk the tree best-first, visiting the nearer
//! child first and pruning any node farther than the best hit so far.

use drape_math::{closest_point_on_triangle, ray_triangle_hit, triangle_normal, Aabb, Vec3};
use drape_mesh::TriangleMesh;
use drape_types::{DrapeError, DrapeResult, TriangleId};

use crate::surface::{SurfaceHit, SurfaceQueryable};

/// Maximum triangles per leaf.
pub const LEAF_SIZE: usize = 4;

/// Traversal stack depth. Median splits keep the tree depth near
/// `log2(n / LEAF_SIZE)`, far below this.
const STACK_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy)]
struct BvhNode {
    bounds: Aabb,
    /// First slot in `order` (leaves only).
    first: u32,
    /// Triangle count; zero marks an interior node.
    count: u32,
    /// Right child (interior nodes only).
    right: u32,
}

/// BVH over the non-degenerate triangles of a body mesh.
#[derive(Debug, Clone)]
pub struct TriangleBvh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    normals: Vec<Vec3>,
    /// Index of each kept triangle in the source mesh.
    face_ids: Vec<u32>,
    /// Leaf slot → triangle.
    order: Vec<u32>,
    nodes: Vec<BvhNode>,
}

impl TriangleBvh {
    /// Builds the hierarchy. Zero-area triangles are left out.
    pub fn build(mesh: &TriangleMesh) -> DrapeResult<Self> {
        mesh.validate()?;

        let vertices: Vec<Vec3> = (0..mesh.vertex_count())
            .map(|i| mesh.position_vec3(i))
            .collect();
        let mut triangles = Vec::with_capacity(mesh.triangle_count());
        let mut normals = Vec::with_capacity(mesh.triangle_count());
        let mut face_ids = Vec::with_capacity(mesh.triangle_count());
        for t in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle_positions(t);
            if let Some(n) = triangle_normal(a, b, c) {
                triangles.push(mesh.triangle(t));
                normals.push(n);
                face_ids.push(t as u32);
            }
        }
        if triangles.is_empty() {
            return Err(DrapeError::InvalidMesh(
                "Body mesh has no non-degenerate faces".into(),
            ));
        }

        let tri_bounds: Vec<Aabb> = triangles
            .iter()
            .map(|&[a, b, c]| {
                Aabb::from_points(&[
                    vertices[a as usize],
                    vertices[b as usize],
                    vertices[c as usize],
                ])
            })
            .collect();
        let centroids: Vec<Vec3> = tri_bounds.iter().map(Aabb::center).collect();

        let mut order: Vec<u32> = (0..triangles.len() as u32).collect();
        let mut nodes = Vec::with_capacity(2 * triangles.len() / LEAF_SIZE + 1);
        build_range(&mut nodes, &mut order, 0, &tri_bounds, &centroids);

        Ok(Self {
            vertices,
            triangles,
            normals,
            face_ids,
            order,
            nodes,
        })
    }

    /// Number of nodes in the hierarchy.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of triangles indexed.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Bounds of the whole surface.
    pub fn bounds(&self) -> Aabb {
        self.nodes[0].bounds
    }

    #[inline]
    fn corners(&self, t: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[t];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }
}

fn build_range(
    nodes: &mut Vec<BvhNode>,
    prims: &mut [u32],
    first: usize,
    tri_bounds: &[Aabb],
    centroids: &[Vec3],
) -> usize {
    let bounds = prims
        .iter()
        .fold(Aabb::EMPTY, |b, &t| b.union(&tri_bounds[t as usize]));
    let index = nodes.len();
    nodes.push(BvhNode {
        bounds,
        first: first as u32,
        count: 0,
        right: 0,
    });

    if prims.len() <= LEAF_SIZE {
        nodes[index].count = prims.len() as u32;
        return index;
    }

    let mut centroid_bounds = Aabb::EMPTY;
    for &t in prims.iter() {
        centroid_bounds.grow(centroids[t as usize]);
    }
    let axis = centroid_bounds.longest_axis();
    let mid = prims.len() / 2;
    prims.select_nth_unstable_by(mid, |&a, &b| {
        centroids[a as usize][axis].total_cmp(&centroids[b as usize][axis])
    });

    let (left, right) = prims.split_at_mut(mid);
    build_range(nodes, left, first, tri_bounds, centroids);
    let right_index = build_range(nodes, right, first + mid, tri_bounds, centroids);
    nodes[index].right = right_index as u32;
    index
}

impl SurfaceQueryable for TriangleBvh {
    fn closest_point(&self, p: Vec3) -> Option<SurfaceHit> {
        let mut best_d2 = f32::INFINITY;
        let mut best: Option<(usize, Vec3)> = None;

        let mut stack = [0u32; STACK_DEPTH];
        let mut top = 1;
        while top > 0 {
            top -= 1;
            let node = &self.nodes[stack[top] as usize];
            if node.bounds.distance_squared(p) >= best_d2 {
                continue;
            }

            if node.count > 0 {
                for slot in node.first..node.first + node.count {
                    let t = self.order[slot as usize] as usize;
                    let [a, b, c] = self.corners(t);
                    let cp = closest_point_on_triangle(p, a, b, c).point;
                    let d2 = (cp - p).length_squared();
                    if d2 < best_d2 {
                        best_d2 = d2;
                        best = Some((t, cp));
                    }
                }
                continue;
            }

            let left = stack[top] + 1;
            let right = node.right;
            let dl = self.nodes[left as usize].bounds.distance_squared(p);
            let dr = self.nodes[right as usize].bounds.distance_squared(p);
            let (near, far) = if dl <= dr { (left, right) } else { (right, left) };
            if top + 2 > STACK_DEPTH {
                continue;
            }
            stack[top] = far;
            stack[top + 1] = near;
            top += 2;
        }

        best.map(|(t, point)| SurfaceHit {
            point,
            normal: self.normals[t],
            distance: best_d2.sqrt(),
            face: TriangleId(self.face_ids[t]),
        })
    }

    fn face_normal(&self, face: TriangleId) -> Option<Vec3> {
        // Kept faces are stored in source order.
        let t = self.face_ids.binary_search(&face.0).ok()?;
        Some(self.normals[t])
    }

    fn ray_crossings(&self, origin: Vec3, direction: Vec3) -> usize {
        let inv_dir = direction.recip();
        let mut crossings = 0;
        let mut stack = [0u32; STACK_DEPTH];
        let mut top = 1;
        while top > 0 {
            top -= 1;
            let index = stack[top];
            let node = &self.nodes[index as usize];
            if !node.bounds.intersects_ray(origin, inv_dir) {
                continue;
            }
            if node.count > 0 {
                for slot in node.first..node.first + node.count {
                    let [a, b, c] = self.corners(self.order[slot as usize] as usize);
                    if ray_triangle_hit(origin, direction, a, b, c).is_some() {
                        crossings += 1;
                    }
                }
            } else if top + 2 <= STACK_DEPTH {
                stack[top] = index + 1;
                stack[top + 1] = node.right;
                top += 2;
            }
        }
        crossings
    }

    fn name(&self) -> &str {
        "triangle_bvh"
    }
}
