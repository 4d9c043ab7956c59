//! Benchmark scenarios: procedural cloth, body, pinning and config for each case.
//!
//! Four canonical scenarios for regression testing:
//! 1. **Hanging sheet**: cloth pinned along one edge, hanging under gravity
//! 2. **Sphere drape**: free cloth falls onto a sphere
//! 3. **Tube on cylinder**: an open tube held at its collar around a body cylinder
//! 4. **Grab and release**: the hanging sheet dragged by one particle, then thrown

use std::fmt;
use std::str::FromStr;

use drape_math::Vec3;
use drape_mesh::generators::{capped_cylinder, horizontal_grid, tube, uv_sphere};
use drape_mesh::TriangleMesh;
use drape_solver::{PinRule, SimulationConfig};
use drape_types::constants::DEFAULT_FRAME_DT;
use drape_types::{DrapeError, ParticleId};
use serde::{Deserialize, Serialize};

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    HangingSheet,
    SphereDrape,
    TubeOnCylinder,
    GrabAndRelease,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::HangingSheet,
            ScenarioKind::SphereDrape,
            ScenarioKind::TubeOnCylinder,
            ScenarioKind::GrabAndRelease,
        ]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::HangingSheet => "hanging_sheet",
            ScenarioKind::SphereDrape => "sphere_drape",
            ScenarioKind::TubeOnCylinder => "tube_on_cylinder",
            ScenarioKind::GrabAndRelease => "grab_and_release",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioKind {
    type Err = DrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioKind::all()
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
                DrapeError::InvalidConfig(format!(
                    "Unknown scenario: '{s}'. Available: {}, all",
                    names.join(", ")
                ))
            })
    }
}

/// Scripted grab: hold `particle` from `begin_frame`, drag the target by
/// `pull` over the held frames, release at `end_frame`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabScript {
    pub particle: ParticleId,
    pub begin_frame: u32,
    pub end_frame: u32,
    pub pull: Vec3,
}

impl GrabScript {
    /// Target for `frame`, given where the particle was at grab time.
    pub fn target(&self, origin: Vec3, frame: u32) -> Vec3 {
        let span = self.end_frame.saturating_sub(self.begin_frame).max(1) as f32;
        let t = (frame.saturating_sub(self.begin_frame) as f32 / span).min(1.0);
        origin + self.pull * t
    }
}

/// A fully specified benchmark scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub cloth: TriangleMesh,
    pub body: TriangleMesh,
    pub pin: PinRule,
    pub config: SimulationConfig,
    /// Number of frames to simulate.
    pub frames: u32,
    /// Frame timestep (seconds).
    pub frame_dt: f32,
    pub grab: Option<GrabScript>,
}

/// Sheet resolution shared by the hanging scenarios.
const SHEET_COLS: usize = 20;

impl Scenario {
    /// A 1 m × 1 m sheet at 20×20 resolution, horizontal at y = 1, pinned
    /// along one edge, hanging for 2 seconds.
    pub fn hanging_sheet() -> Self {
        let cloth = horizontal_grid(SHEET_COLS, SHEET_COLS, 1.0, 1.0, 1.0);
        let pin = PinRule::Indices {
            indices: (0..=SHEET_COLS as u32).collect(),
        };

        // Out of reach of the sheet; the engine always needs a body.
        let mut body = uv_sphere(0.1, 8, 12);
        body.translate(Vec3::new(0.0, -2.0, 0.0));

        Self {
            kind: ScenarioKind::HangingSheet,
            cloth,
            body,
            pin,
            config: SimulationConfig::default(),
            frames: 120,
            frame_dt: DEFAULT_FRAME_DT,
            grab: None,
        }
    }

    /// A 1.5 m × 1.5 m free sheet falls onto a 0.3 m sphere.
    pub fn sphere_drape() -> Self {
        Self {
            kind: ScenarioKind::SphereDrape,
            cloth: horizontal_grid(SHEET_COLS, SHEET_COLS, 1.5, 1.5, 0.5),
            body: uv_sphere(0.3, 16, 32),
            pin: PinRule::None,
            config: SimulationConfig::default(),
            frames: 180,
            frame_dt: DEFAULT_FRAME_DT,
            grab: None,
        }
    }

    /// An open tube held at every sixth collar vertex, hanging around a
    /// capped cylinder. The free collar edges exercise the tighter limit.
    pub fn tube_on_cylinder() -> Self {
        let segments = 24;
        let rings = 10;
        let cloth = tube(0.23, 0.5, segments, rings, 0.65);
        let collar_start = (rings * segments) as u32;
        let pin = PinRule::Indices {
            indices: (0..segments as u32)
                .step_by(6)
                .map(|j| collar_start + j)
                .collect(),
        };

        Self {
            kind: ScenarioKind::TubeOnCylinder,
            cloth,
            body: capped_cylinder(0.2, 1.2, segments, 0.0),
            pin,
            config: SimulationConfig::default(),
            frames: 120,
            frame_dt: DEFAULT_FRAME_DT,
            grab: None,
        }
    }

    /// The hanging sheet, grabbed at the middle of its free edge, pulled
    /// sideways and up, then released.
    pub fn grab_and_release() -> Self {
        let mut scenario = Self::hanging_sheet();
        let verts = SHEET_COLS + 1;
        scenario.kind = ScenarioKind::GrabAndRelease;
        scenario.frames = 150;
        scenario.grab = Some(GrabScript {
            particle: ParticleId((verts * SHEET_COLS + SHEET_COLS / 2) as u32),
            begin_frame: 40,
            end_frame: 80,
            pull: Vec3::new(0.4, 0.3, 0.0),
        });
        scenario
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::HangingSheet => Self::hanging_sheet(),
            ScenarioKind::SphereDrape => Self::sphere_drape(),
            ScenarioKind::TubeOnCylinder => Self::tube_on_cylinder(),
            ScenarioKind::GrabAndRelease => Self::grab_and_release(),
        }
    }

    /// Replace the configuration (e.g. a preset or a loaded TOML file).
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }
}
