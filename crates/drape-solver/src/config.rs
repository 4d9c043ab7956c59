//! Simulation configuration.
//!
//! One immutable struct carries every tunable. The engine takes it by
//! value at construction and hands shared references to the sub-solvers.

use drape_types::constants::{
    DEFAULT_DRAG, DEFAULT_FRICTION, DEFAULT_SUBSTEPS, GRAB_RADIUS, GRAVITY, MAX_FRAME_DT,
    MAX_PARTICLE_SPEED, RESCUE_OFFSET, SAFETY_BOUND, SELF_COLLISION_THICKNESS, SKIN_OFFSET,
};
use drape_types::{DrapeError, DrapeResult};
use serde::{Deserialize, Serialize};

/// How the body collider decides that a particle is inside the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsideTest {
    /// Sign of the offset along the closest face normal.
    #[default]
    NormalDot,
    /// Ray-crossing parity. Needs a closed body; robust near thin features.
    Parity,
}

/// Configuration for a cloth simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Gravity vector [gx, gy, gz] in m/s².
    pub gravity: [f32; 3],

    /// Constant directional acceleration (wind) in m/s².
    pub wind: [f32; 3],

    /// Substeps per frame.
    pub substeps: u32,

    /// Frame timesteps above this are clamped (seconds).
    pub max_frame_dt: f32,

    /// Velocity retained per substep (1.0 = no drag).
    pub drag: f32,

    /// Particle speed cap (m/s). Zero or negative disables the cap.
    pub max_speed: f32,

    /// Compliance of structural (edge) constraints. Zero is rigid.
    pub structural_compliance: f32,

    /// Compliance of bending (2-hop) constraints.
    pub bending_compliance: f32,

    /// Compliance of the grab spring.
    pub interaction_compliance: f32,

    /// Whether the hard stretch-limit pass runs.
    pub stretch_limits: bool,

    /// Maximum edge length as a multiple of rest length.
    pub stretch_limit: f32,

    /// Tighter stretch limit for edges along the collar.
    pub collar_stretch_limit: f32,

    /// Vertical band below the top boundary vertex that counts as collar (meters).
    pub collar_tolerance: f32,

    /// Standoff kept between cloth and body (meters).
    pub skin_offset: f32,

    /// Push-out distance for particles found inside the body (meters).
    pub rescue_offset: f32,

    /// Tangential friction against the body (0 = frictionless, 1 = sticky).
    pub friction: f32,

    /// Body collision passes per substep.
    pub body_passes: u32,

    /// Inside/outside classification used by the body collider.
    pub inside_test: InsideTest,

    /// Optional floor height (Y). `None` disables the floor.
    pub floor_height: Option<f32>,

    /// Whether cloth-cloth collisions are resolved.
    pub self_collision: bool,

    /// Minimum separation between non-adjacent cloth particles (meters).
    pub self_collision_thickness: f32,

    /// Fraction of self-collision overlap corrected per pass, in (0, 1].
    pub self_collision_stiffness: f32,

    /// Area-grab radius around the grabbed particle (meters). Zero grabs one particle.
    pub grab_radius: f32,

    /// Release velocities are clamped to this speed (m/s).
    pub max_throw_speed: f32,

    /// Any coordinate beyond this magnitude triggers a particle reset (meters).
    pub safety_bound: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -GRAVITY, 0.0],
            wind: [0.0; 3],
            substeps: DEFAULT_SUBSTEPS,
            max_frame_dt: MAX_FRAME_DT,
            drag: DEFAULT_DRAG,
            max_speed: MAX_PARTICLE_SPEED,
            structural_compliance: 1.0e-5,
            bending_compliance: 1.0e-3,
            interaction_compliance: 1.0e-7,
            stretch_limits: true,
            stretch_limit: 1.15,
            collar_stretch_limit: 1.05,
            collar_tolerance: 0.15,
            skin_offset: SKIN_OFFSET,
            rescue_offset: RESCUE_OFFSET,
            friction: DEFAULT_FRICTION,
            body_passes: 2,
            inside_test: InsideTest::NormalDot,
            floor_height: None,
            self_collision: true,
            self_collision_thickness: SELF_COLLISION_THICKNESS,
            self_collision_stiffness: 0.25,
            grab_radius: GRAB_RADIUS,
            max_throw_speed: MAX_PARTICLE_SPEED,
            safety_bound: SAFETY_BOUND,
        }
    }
}

impl SimulationConfig {
    /// Cheap interactive preview (fewer substeps, single collision pass).
    pub fn preview() -> Self {
        Self {
            substeps: 8,
            body_passes: 1,
            self_collision: false,
            ..Default::default()
        }
    }

    /// Offline-quality drape (more substeps, stiffer cloth, parity inside test).
    pub fn high_quality() -> Self {
        Self {
            substeps: 40,
            body_passes: 3,
            structural_compliance: 1.0e-6,
            inside_test: InsideTest::Parity,
            ..Default::default()
        }
    }

    /// Gravity plus wind, as one acceleration.
    pub fn external_acceleration(&self) -> drape_math::Vec3 {
        drape_math::Vec3::from(self.gravity) + drape_math::Vec3::from(self.wind)
    }

    /// Checks that every value is in a usable range.
    pub fn validate(&self) -> DrapeResult<()> {
        fn invalid(msg: impl Into<String>) -> DrapeResult<()> {
            Err(DrapeError::InvalidConfig(msg.into()))
        }

        if self.gravity.iter().chain(&self.wind).any(|v| !v.is_finite()) {
            return invalid("gravity and wind must be finite");
        }
        if self.substeps == 0 {
            return invalid("substeps must be at least 1");
        }
        if !(self.max_frame_dt > 0.0 && self.max_frame_dt.is_finite()) {
            return invalid(format!(
                "max_frame_dt must be positive and finite, got {}",
                self.max_frame_dt
            ));
        }
        if !(0.0..=1.0).contains(&self.drag) {
            return invalid(format!("drag must be in [0, 1], got {}", self.drag));
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return invalid(format!("friction must be in [0, 1], got {}", self.friction));
        }
        for (name, value) in [
            ("structural_compliance", self.structural_compliance),
            ("bending_compliance", self.bending_compliance),
            ("interaction_compliance", self.interaction_compliance),
        ] {
            if !(value >= 0.0) {
                return invalid(format!("{} must be non-negative, got {}", name, value));
            }
        }
        if self.stretch_limit < 1.0 || self.collar_stretch_limit < 1.0 {
            return invalid("stretch limits must be at least 1.0");
        }
        if !(self.skin_offset > 0.0) {
            return invalid(format!("skin_offset must be positive, got {}", self.skin_offset));
        }
        if self.rescue_offset < self.skin_offset {
            return invalid("rescue_offset must not be smaller than skin_offset");
        }
        if self.body_passes == 0 {
            return invalid("body_passes must be at least 1");
        }
        if self.self_collision
            && (!(self.self_collision_thickness > 0.0)
                || !(self.self_collision_stiffness > 0.0 && self.self_collision_stiffness <= 1.0))
        {
            return invalid("self-collision needs positive thickness and stiffness in (0, 1]");
        }
        if !(self.max_speed > 0.0 && self.max_speed.is_finite()) {
            return invalid(format!("max_speed must be positive and finite, got {}", self.max_speed));
        }
        if !(self.grab_radius >= 0.0 && self.grab_radius.is_finite())
            || !(self.max_throw_speed >= 0.0 && self.max_throw_speed.is_finite())
        {
            return invalid("grab_radius and max_throw_speed must be non-negative and finite");
        }
        if !(self.safety_bound > 0.0 && self.safety_bound.is_finite()) {
            return invalid(format!(
                "safety_bound must be positive and finite, got {}",
                self.safety_bound
            ));
        }
        Ok(())
    }
}
