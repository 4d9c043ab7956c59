//! Simulation event types.
//!
//! Events are small value types tagged with the frame that produced them.

use serde::{Deserialize, Serialize};

/// A simulation event emitted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Frame number (0-indexed).
    pub frame: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Frame started.
    FrameBegin {
        /// Clamped frame timestep (seconds).
        dt: f32,
        substeps: u32,
    },

    /// Frame completed.
    FrameEnd {
        /// Wall-clock time for the whole frame (seconds).
        wall_time: f64,
    },

    /// Body and floor contacts over the frame.
    BodyContacts {
        /// Particle corrections summed over substeps and passes.
        resolved: u32,
        /// Particles rescued from inside the body.
        deep: u32,
        /// Largest single correction (meters).
        max_correction: f32,
    },

    /// Cloth self-contacts over the frame.
    SelfContacts { pairs: u32 },

    /// A grab started.
    InteractionBegin {
        particle: u32,
        /// Particles captured by the area grab.
        members: u32,
    },

    /// A grab was released.
    InteractionEnd {
        particle: u32,
        /// Throw speed handed to the cloth (m/s).
        throw_speed: f32,
    },

    /// Particles reset by the safety guard.
    StateReset { particles: Vec<u32> },

    /// Penetration diagnostics snapshot.
    Diagnostics {
        penetrating: u32,
        total: u32,
        avg_depth: f32,
        max_depth: f32,
    },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given frame.
    pub fn new(frame: u64, kind: EventKind) -> Self {
        Self { frame, kind }
    }
}
