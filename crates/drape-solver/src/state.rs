//! Particle state, stored as SoA buffers.
//!
//! Velocity is implicit: it is the displacement `pos - prev` over the last
//! substep. Pinned particles carry `inv_mass == 0` and are never moved by
//! any solver stage.

use drape_math::Vec3;
use drape_mesh::TriangleMesh;
use drape_types::{DrapeError, DrapeResult, ParticleId};

/// SoA particle buffers.
///
/// All arrays have length `vertex_count`:
/// ```text
/// pos_x:  [x0, x1, x2, ...]
/// prev_x: [x0', x1', x2', ...]
/// ...
/// ```
#[derive(Debug, Clone)]
pub struct PhysicsState {
    /// Number of particles.
    pub vertex_count: usize,

    // ─── Position (current) ───
    pub pos_x: Vec<f32>,
    pub pos_y: Vec<f32>,
    pub pos_z: Vec<f32>,

    // ─── Previous position (Verlet) ───
    pub prev_x: Vec<f32>,
    pub prev_y: Vec<f32>,
    pub prev_z: Vec<f32>,

    // ─── Rest position (safe reset target) ───
    pub rest_x: Vec<f32>,
    pub rest_y: Vec<f32>,
    pub rest_z: Vec<f32>,

    /// Inverse mass; `0.0` means pinned.
    pub inv_mass: Vec<f32>,
}

impl PhysicsState {
    /// Build particle state from a cloth mesh.
    ///
    /// Positions are copied into both current and previous buffers, so
    /// every particle starts at rest. `pin` decides per particle whether
    /// it is fixed in place.
    pub fn initialize(
        mesh: &TriangleMesh,
        pin: impl Fn(ParticleId, Vec3) -> bool,
    ) -> DrapeResult<Self> {
        mesh.validate()?;
        let n = mesh.vertex_count();

        let inv_mass = (0..n)
            .map(|i| {
                if pin(ParticleId(i as u32), mesh.position_vec3(i)) {
                    0.0
                } else {
                    1.0
                }
            })
            .collect();

        Ok(Self {
            vertex_count: n,
            pos_x: mesh.pos_x.clone(),
            pos_y: mesh.pos_y.clone(),
            pos_z: mesh.pos_z.clone(),
            prev_x: mesh.pos_x.clone(),
            prev_y: mesh.pos_y.clone(),
            prev_z: mesh.pos_z.clone(),
            rest_x: mesh.pos_x.clone(),
            rest_y: mesh.pos_y.clone(),
            rest_z: mesh.pos_z.clone(),
            inv_mass,
        })
    }

    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i])
    }

    #[inline]
    pub fn set_position(&mut self, i: usize, p: Vec3) {
        self.pos_x[i] = p.x;
        self.pos_y[i] = p.y;
        self.pos_z[i] = p.z;
    }

    #[inline]
    pub fn prev_position(&self, i: usize) -> Vec3 {
        Vec3::new(self.prev_x[i], self.prev_y[i], self.prev_z[i])
    }

    #[inline]
    pub fn set_prev_position(&mut self, i: usize, p: Vec3) {
        self.prev_x[i] = p.x;
        self.prev_y[i] = p.y;
        self.prev_z[i] = p.z;
    }

    #[inline]
    pub fn rest_position(&self, i: usize) -> Vec3 {
        Vec3::new(self.rest_x[i], self.rest_y[i], self.rest_z[i])
    }

    /// Displacement over the last substep.
    #[inline]
    pub fn velocity(&self, i: usize) -> Vec3 {
        self.position(i) - self.prev_position(i)
    }

    #[inline]
    pub fn is_pinned(&self, i: usize) -> bool {
        self.inv_mass[i] == 0.0
    }

    /// Number of particles that are not pinned.
    pub fn free_count(&self) -> usize {
        self.inv_mass.iter().filter(|&&w| w > 0.0).count()
    }

    /// Moves a particle to `p` with zero velocity. Also replaces its rest
    /// position, so later safety resets land there.
    pub fn place_at_rest(&mut self, i: usize, p: Vec3) {
        self.set_position(i, p);
        self.set_prev_position(i, p);
        self.rest_x[i] = p.x;
        self.rest_y[i] = p.y;
        self.rest_z[i] = p.z;
    }

    /// Sends a particle back to its rest position with zero velocity.
    pub fn reset_particle(&mut self, i: usize) {
        let rest = self.rest_position(i);
        self.set_position(i, rest);
        self.set_prev_position(i, rest);
    }

    /// Copies current positions, interleaved `[x0, y0, z0, ...]`, into `target`.
    pub fn sync_to(&self, target: &mut [f32]) -> DrapeResult<()> {
        if target.len() != self.vertex_count * 3 {
            return Err(DrapeError::InvalidConfig(format!(
                "Sync target holds {} floats, expected {}",
                target.len(),
                self.vertex_count * 3
            )));
        }
        for (i, out) in target.chunks_exact_mut(3).enumerate() {
            out[0] = self.pos_x[i];
            out[1] = self.pos_y[i];
            out[2] = self.pos_z[i];
        }
        Ok(())
    }

    /// Current positions as a fresh interleaved buffer.
    pub fn positions_interleaved(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.vertex_count * 3];
        for (i, chunk) in out.chunks_exact_mut(3).enumerate() {
            chunk[0] = self.pos_x[i];
            chunk[1] = self.pos_y[i];
            chunk[2] = self.pos_z[i];
        }
        out
    }

    /// Largest absolute coordinate over all particles.
    pub fn max_abs_coordinate(&self) -> f32 {
        self.pos_x
            .iter()
            .chain(&self.pos_y)
            .chain(&self.pos_z)
            .fold(0.0_f32, |m, &v| m.max(v.abs()))
    }

    /// True if every position component is finite.
    pub fn is_finite(&self) -> bool {
        self.pos_x
            .iter()
            .chain(&self.pos_y)
            .chain(&self.pos_z)
            .all(|v| v.is_finite())
    }
}
