//! Declarative pin rules.
//!
//! Hosts usually describe which garment vertices stay fixed rather than
//! listing them. Each rule resolves to a per-particle mask once, at
//! construction.

use drape_mesh::{BoundaryRing, TriangleMesh};
use serde::{Deserialize, Serialize};

/// Which particles are pinned (`inv_mass = 0`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum PinRule {
    /// Everything moves.
    #[default]
    None,
    /// Everything is fixed.
    All,
    /// Particles at or above `height`.
    AboveHeight { height: f32 },
    /// Particles high up and close to the body's center line: a neckline
    /// held on a hanger.
    NeckRegion { min_height: f32, max_abs_x: f32 },
    /// The detected collar boundary ring.
    Collar,
    /// Explicit particle indices.
    Indices { indices: Vec<u32> },
}

impl PinRule {
    /// Resolves the rule into a per-vertex mask.
    pub fn mask(&self, mesh: &TriangleMesh, collar: &BoundaryRing) -> Vec<bool> {
        let n = mesh.vertex_count();
        match self {
            PinRule::None => vec![false; n],
            PinRule::All => vec![true; n],
            PinRule::AboveHeight { height } => mesh.pos_y.iter().map(|&y| y >= *height).collect(),
            PinRule::NeckRegion {
                min_height,
                max_abs_x,
            } => (0..n)
                .map(|i| mesh.pos_y[i] > *min_height && mesh.pos_x[i].abs() < *max_abs_x)
                .collect(),
            PinRule::Collar => (0..n as u32).map(|v| collar.contains(v)).collect(),
            PinRule::Indices { indices } => {
                let mut mask = vec![false; n];
                for &i in indices {
                    if let Some(slot) = mask.get_mut(i as usize) {
                        *slot = true;
                    }
                }
                mask
            }
        }
    }
}
