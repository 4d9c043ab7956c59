//! Mesh topology queries.
//!
//! Builds the adjacency data the solver needs from the triangle index
//! buffer: unique edges, per-vertex neighbor lists, per-edge face counts,
//! 2-hop bending pairs and the open boundary ring used as the collar.
//!
//! Edge identity uses the numeric key `min * N + max`, so deduplication
//! never allocates per edge.

use std::collections::{HashMap, HashSet};

use crate::mesh::TriangleMesh;

/// Canonical numeric key of the unordered vertex pair `(a, b)` in a mesh
/// with `vertex_count` vertices.
#[inline]
pub fn canonical_key(a: u32, b: u32, vertex_count: usize) -> u64 {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    lo as u64 * vertex_count as u64 + hi as u64
}

/// Precomputed topology information for a triangle mesh.
///
/// Built once at engine construction and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Topology {
    vertex_count: usize,

    /// Unique edges as `[v_min, v_max]`, in first-seen order.
    pub edges: Vec<[u32; 2]>,

    /// For each edge, the number of triangles using it.
    /// Boundary edges have exactly one.
    pub edge_face_count: Vec<u32>,

    /// For each vertex, the vertices sharing an edge with it.
    pub neighbors: Vec<Vec<u32>>,

    edge_lookup: HashMap<u64, u32>,
}

/// The open boundary loop nearest the top of a garment (the collar).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryRing {
    /// Member vertex indices, ascending.
    pub vertices: Vec<u32>,
    member: Vec<bool>,
}

impl BoundaryRing {
    /// Returns true if vertex `v` belongs to the ring.
    #[inline]
    pub fn contains(&self, v: u32) -> bool {
        self.member.get(v as usize).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl Topology {
    /// Build topology from a triangle mesh.
    pub fn build(mesh: &TriangleMesh) -> Self {
        let vertex_count = mesh.vertex_count();
        let scan = EdgeScan::run(&mesh.indices, vertex_count);

        let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];
        for &[a, b] in &scan.edges {
            neighbors[a as usize].push(b);
            neighbors[b as usize].push(a);
        }

        Self {
            vertex_count,
            edges: scan.edges,
            edge_face_count: scan.face_count,
            neighbors,
            edge_lookup: scan.lookup,
        }
    }

    /// Number of vertices the topology was built for.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Returns true if `a` and `b` share an edge.
    #[inline]
    pub fn is_edge(&self, a: u32, b: u32) -> bool {
        self.edge_lookup
            .contains_key(&canonical_key(a, b, self.vertex_count))
    }

    /// Unique structural edges extracted from a raw index buffer.
    pub fn build_edges(indices: &[u32], vertex_count: usize) -> Vec<[u32; 2]> {
        EdgeScan::run(indices, vertex_count).edges
    }

    /// Vertex pairs two hops apart that are not themselves an edge.
    ///
    /// Each unordered pair appears once, as `[min, max]`.
    pub fn bending_edges(&self) -> Vec<[u32; 2]> {
        let mut seen: HashSet<u64> = HashSet::new();
        let mut pairs = Vec::new();
        for (i, ring) in self.neighbors.iter().enumerate() {
            let i = i as u32;
            for &j in ring {
                for &k in &self.neighbors[j as usize] {
                    if k == i || self.is_edge(i, k) {
                        continue;
                    }
                    if seen.insert(canonical_key(i, k, self.vertex_count)) {
                        pairs.push([i.min(k), i.max(k)]);
                    }
                }
            }
        }
        pairs
    }

    /// Edges used by exactly one triangle.
    pub fn boundary_edges(&self) -> impl Iterator<Item = [u32; 2]> + '_ {
        self.edges
            .iter()
            .zip(&self.edge_face_count)
            .filter(|(_, &count)| count == 1)
            .map(|(&e, _)| e)
    }

    /// Returns the number of boundary edges.
    pub fn boundary_edge_count(&self) -> usize {
        self.boundary_edges().count()
    }

    /// Returns true if the mesh is closed (no boundary edges).
    pub fn is_closed(&self) -> bool {
        self.boundary_edge_count() == 0
    }

    /// Boundary vertices within `tolerance` of the highest boundary vertex.
    ///
    /// On a garment this picks out the neckline. A closed mesh has no
    /// boundary and yields an empty ring.
    pub fn detect_boundary_ring(&self, mesh: &TriangleMesh, tolerance: f32) -> BoundaryRing {
        let mut on_boundary = vec![false; self.vertex_count];
        for [a, b] in self.boundary_edges() {
            on_boundary[a as usize] = true;
            on_boundary[b as usize] = true;
        }

        let top = on_boundary
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(|(i, _)| mesh.pos_y[i])
            .fold(f32::NEG_INFINITY, f32::max);
        if !top.is_finite() {
            return BoundaryRing::default();
        }

        let mut member = vec![false; self.vertex_count];
        let mut vertices = Vec::new();
        for (i, &b) in on_boundary.iter().enumerate() {
            if b && mesh.pos_y[i] >= top - tolerance {
                member[i] = true;
                vertices.push(i as u32);
            }
        }

        BoundaryRing { vertices, member }
    }
}

/// Unique edges of an index buffer in first-seen order, with the number
/// of triangles using each.
struct EdgeScan {
    edges: Vec<[u32; 2]>,
    face_count: Vec<u32>,
    lookup: HashMap<u64, u32>,
}

impl EdgeScan {
    fn run(indices: &[u32], vertex_count: usize) -> Self {
        let mut edges: Vec<[u32; 2]> = Vec::with_capacity(indices.len());
        let mut face_count: Vec<u32> = Vec::with_capacity(indices.len());
        let mut lookup: HashMap<u64, u32> = HashMap::with_capacity(indices.len());

        for tri in indices.chunks_exact(3) {
            for (v0, v1) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = canonical_key(v0, v1, vertex_count);
                match lookup.get(&key) {
                    Some(&e) => face_count[e as usize] += 1,
                    None => {
                        lookup.insert(key, edges.len() as u32);
                        edges.push([v0.min(v1), v0.max(v1)]);
                        face_count.push(1);
                    }
                }
            }
        }

        Self {
            edges,
            face_count,
            lookup,
        }
    }
}
