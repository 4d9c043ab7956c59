//! Spatial hash over cloth particles.
//!
//! Uniform grid hashed into a fixed prime-sized table. Buckets are
//! singly linked lists stored in two flat arrays (`first` per bucket,
//! `next` per particle), so a rebuild never allocates.
//!
//! ```text
//! h = ((ix·73856093) ^ (iy·19349663) ^ (iz·83492791)) & 0x7fffffff  mod size
//! ```

use drape_math::Vec3;
use drape_solver::PhysicsState;

const EMPTY: u32 = u32::MAX;

/// Fixed-size spatial hash for neighbor queries.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    inv_cell_size: f32,
    table_size: usize,
    first: Vec<u32>,
    next: Vec<u32>,
}

impl SpatialHash {
    /// Creates a hash sized for `capacity` particles.
    ///
    /// The table holds the smallest prime at least `2 · capacity` buckets.
    pub fn new(capacity: usize, cell_size: f32) -> Self {
        let table_size = next_prime(capacity.max(1) * 2);
        Self {
            inv_cell_size: 1.0 / cell_size.max(1e-6),
            table_size,
            first: vec![EMPTY; table_size],
            next: vec![EMPTY; capacity],
        }
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    #[inline]
    fn cell(&self, p: Vec3) -> [i32; 3] {
        [
            (p.x * self.inv_cell_size).floor() as i32,
            (p.y * self.inv_cell_size).floor() as i32,
            (p.z * self.inv_cell_size).floor() as i32,
        ]
    }

    #[inline]
    fn bucket(&self, [ix, iy, iz]: [i32; 3]) -> usize {
        let h = ix.wrapping_mul(73_856_093) ^ iy.wrapping_mul(19_349_663) ^ iz.wrapping_mul(83_492_791);
        (h & 0x7fff_ffff) as usize % self.table_size
    }

    /// Re-bins every particle at its current position.
    pub fn rebuild(&mut self, state: &PhysicsState) {
        self.first.fill(EMPTY);
        self.next.clear();
        self.next.resize(state.vertex_count, EMPTY);
        for i in 0..state.vertex_count {
            let p = state.position(i);
            if !p.is_finite() {
                continue;
            }
            let b = self.bucket(self.cell(p));
            self.next[i] = self.first[b];
            self.first[b] = i as u32;
        }
    }

    /// Collects into `out` every particle binned in a cell overlapping the
    /// box `[p - radius, p + radius]`. Sorted, without duplicates; callers
    /// still check exact distances.
    pub fn query(&self, p: Vec3, radius: f32, out: &mut Vec<u32>) {
        out.clear();
        let lo = self.cell(p - Vec3::splat(radius));
        let hi = self.cell(p + Vec3::splat(radius));
        for ix in lo[0]..=hi[0] {
            for iy in lo[1]..=hi[1] {
                for iz in lo[2]..=hi[2] {
                    let mut i = self.first[self.bucket([ix, iy, iz])];
                    while i != EMPTY {
                        out.push(i);
                        i = self.next[i as usize];
                    }
                }
            }
        }
        out.sort_unstable();
        out.dedup();
    }
}

/// Smallest prime `>= n` (and at least 2).
pub fn next_prime(n: usize) -> usize {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

fn is_prime(n: usize) -> bool {
    if n < 4 {
        return n >= 2;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
