//! Physical constants and simulation defaults.
//!
//! `SKIN_OFFSET` is the one standoff distance used by initialization,
//! per-substep collision, interaction target clamping and diagnostics.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f32 = 9.81;

/// Fixed frame timestep of the worker thread (seconds).
pub const DEFAULT_FRAME_DT: f32 = 0.016;

/// Upper clamp on a single frame's timestep (seconds).
pub const MAX_FRAME_DT: f32 = 0.064;

/// Default number of substeps per frame.
pub const DEFAULT_SUBSTEPS: u32 = 20;

/// Standoff between cloth and body surface (meters).
pub const SKIN_OFFSET: f32 = 0.015;

/// Push-out distance for particles found inside the body (meters).
pub const RESCUE_OFFSET: f32 = 0.03;

/// Velocity retention per substep.
pub const DEFAULT_DRAG: f32 = 0.97;

/// Tangential friction against the body, 0 = frictionless, 1 = sticky.
pub const DEFAULT_FRICTION: f32 = 0.95;

/// Hard cap on particle speed (m/s).
pub const MAX_PARTICLE_SPEED: f32 = 3.0;

/// Self-collision thickness (meters).
pub const SELF_COLLISION_THICKNESS: f32 = 0.01;

/// Radius of an area grab (meters).
pub const GRAB_RADIUS: f32 = 0.07;

/// Penetration below this depth is not reported by diagnostics (meters).
pub const PENETRATION_REPORT_THRESHOLD: f32 = 0.001;

/// Any coordinate beyond this magnitude counts as an explosion (meters).
pub const SAFETY_BOUND: f32 = 50.0;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f32 = 1.0e-7;

/// Epsilon for degenerate triangle detection (area threshold).
pub const DEGENERATE_AREA_THRESHOLD: f32 = 1.0e-12;
