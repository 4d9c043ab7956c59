//! # drape-telemetry
//!
//! Event bus for simulation telemetry. The engine emits structured
//! events (frame timing, contacts, grabs, safety resets, diagnostics)
//! that pluggable sinks consume.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
