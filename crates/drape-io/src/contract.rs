//! Simulation input/output contract types.
//!
//! These types are serializable for CLI files and API transport.

use drape_mesh::TriangleMesh;
use drape_solver::{PinRule, SimulationConfig};
use drape_types::constants::DEFAULT_FRAME_DT;
use serde::{Deserialize, Serialize};

/// Everything needed to run a drape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    /// The garment mesh to simulate.
    pub cloth: TriangleMesh,

    /// The rigid body the cloth drapes over.
    pub body: TriangleMesh,

    /// Which cloth particles are fixed in place.
    #[serde(default)]
    pub pin: PinRule,

    #[serde(default)]
    pub config: SimulationConfig,

    /// Number of frames to simulate.
    #[serde(default = "default_frames")]
    pub frames: u32,

    /// Frame timestep in seconds.
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f32,
}

fn default_frames() -> u32 {
    120
}

fn default_frame_dt() -> f32 {
    DEFAULT_FRAME_DT
}

impl SimulationInput {
    /// Input with default pinning, config and timing.
    pub fn new(cloth: TriangleMesh, body: TriangleMesh) -> Self {
        Self {
            cloth,
            body,
            pin: PinRule::default(),
            config: SimulationConfig::default(),
            frames: default_frames(),
            frame_dt: default_frame_dt(),
        }
    }

    /// Simulated duration in seconds.
    pub fn duration(&self) -> f32 {
        self.frames as f32 * self.frame_dt
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    /// The cloth in its final state.
    pub draped: TriangleMesh,

    /// Per-particle collision flags of the last frame.
    pub collision_flags: Vec<u8>,

    pub metrics: SimulationMetrics,
}

/// Aggregate metrics from a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    /// Total wall-clock time (seconds).
    pub wall_time_seconds: f64,
    pub frame_count: u32,
    /// Particles reset by the safety guard, summed over frames.
    pub reset_count: u32,
    /// Particles still deeper than 1 mm inside the body at the end.
    pub penetrating_vertices: u32,
    /// Deepest remaining penetration (meters).
    pub max_penetration: f32,
    /// Largest particle displacement from the initial pose (meters).
    pub max_displacement: f32,
}
