//! Lock-free state exchange between a simulation thread and a presenter.
//!
//! One flat buffer of 32-bit words, split into fixed regions:
//!
//! ```text
//! [ positions 3n | prev positions 3n | inv mass n | interaction 5 | flags n ]
//! ```
//!
//! Floats are stored as their bit patterns. Each region has exactly one
//! writer, enforced by the two role views handed out by
//! [`SharedBuffer::split`]: the [`SimulationView`] owns the particle
//! regions, the [`PresentationView`] owns the interaction record. Neither
//! view is `Clone`.
//!
//! There is no frame fence: a presenter may observe a frame half written.
//! The interaction record is published with a release store of its state
//! word, so a reader that sees the state also sees the fields written
//! before it.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use drape_math::Vec3;
use drape_solver::InteractionRecord;
use drape_types::{DrapeError, DrapeResult, ParticleId};

use crate::engine::ClothEngine;

/// Word offsets of each region for a given particle count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedLayout {
    pub vertex_count: usize,
}

impl SharedLayout {
    /// State, particle index, target x/y/z.
    pub const INTERACTION_SLOTS: usize = 5;

    pub fn new(vertex_count: usize) -> Self {
        Self { vertex_count }
    }

    pub fn positions(&self) -> Range<usize> {
        0..3 * self.vertex_count
    }

    pub fn prev_positions(&self) -> Range<usize> {
        let start = self.positions().end;
        start..start + 3 * self.vertex_count
    }

    pub fn inv_mass(&self) -> Range<usize> {
        let start = self.prev_positions().end;
        start..start + self.vertex_count
    }

    pub fn interaction(&self) -> Range<usize> {
        let start = self.inv_mass().end;
        start..start + Self::INTERACTION_SLOTS
    }

    pub fn collision_flags(&self) -> Range<usize> {
        let start = self.interaction().end;
        start..start + self.vertex_count
    }

    /// Total buffer length in words.
    pub fn total_words(&self) -> usize {
        self.collision_flags().end
    }
}

const INTERACTION_IDLE: u32 = 0;
const INTERACTION_ACTIVE: u32 = 1;

/// The shared word buffer. Split it into role views to use it.
#[derive(Debug)]
pub struct SharedBuffer {
    layout: SharedLayout,
    words: Arc<[AtomicU32]>,
}

impl SharedBuffer {
    /// Allocates a zeroed buffer for `vertex_count` particles.
    pub fn new(vertex_count: usize) -> Self {
        let layout = SharedLayout::new(vertex_count);
        let words: Arc<[AtomicU32]> = (0..layout.total_words()).map(|_| AtomicU32::new(0)).collect();
        Self { layout, words }
    }

    pub fn layout(&self) -> SharedLayout {
        self.layout
    }

    /// Hands out the only presenter and the only simulation view.
    pub fn split(self) -> (PresentationView, SimulationView) {
        let words = Words {
            layout: self.layout,
            words: self.words,
        };
        (
            PresentationView {
                words: words.clone(),
            },
            SimulationView { words },
        )
    }
}

#[derive(Debug, Clone)]
struct Words {
    layout: SharedLayout,
    words: Arc<[AtomicU32]>,
}

impl Words {
    fn load(&self, idx: usize) -> u32 {
        self.words[idx].load(Ordering::Relaxed)
    }

    fn store(&self, idx: usize, value: u32) {
        self.words[idx].store(value, Ordering::Relaxed);
    }

    fn load_f32(&self, idx: usize) -> f32 {
        f32::from_bits(self.load(idx))
    }

    fn store_f32(&self, idx: usize, value: f32) {
        self.store(idx, value.to_bits());
    }

    fn load_vec3(&self, start: usize) -> Vec3 {
        Vec3::new(
            self.load_f32(start),
            self.load_f32(start + 1),
            self.load_f32(start + 2),
        )
    }
}

/// Presenter side: reads particles, writes the interaction record.
#[derive(Debug)]
pub struct PresentationView {
    words: Words,
}

impl PresentationView {
    pub fn layout(&self) -> SharedLayout {
        self.words.layout
    }

    /// Position of particle `i`.
    pub fn position(&self, i: usize) -> Vec3 {
        self.words.load_vec3(self.words.layout.positions().start + 3 * i)
    }

    /// Copies all positions into an interleaved buffer.
    pub fn read_positions(&self, out: &mut [f32]) -> DrapeResult<()> {
        let range = self.words.layout.positions();
        if out.len() != range.len() {
            return Err(DrapeError::InvalidConfig(format!(
                "position buffer length {} does not match {}",
                out.len(),
                range.len()
            )));
        }
        for (slot, idx) in out.iter_mut().zip(range) {
            *slot = self.words.load_f32(idx);
        }
        Ok(())
    }

    pub fn inv_mass(&self, i: usize) -> f32 {
        self.words.load_f32(self.words.layout.inv_mass().start + i)
    }

    pub fn collision_flag(&self, i: usize) -> u8 {
        self.words.load(self.words.layout.collision_flags().start + i) as u8
    }

    /// Requests a grab of `particle` toward `target`, or moves the target
    /// of the grab in progress.
    pub fn request_grab(&self, particle: ParticleId, target: Vec3) {
        let start = self.words.layout.interaction().start;
        self.words.store(start + 1, particle.0);
        self.words.store_f32(start + 2, target.x);
        self.words.store_f32(start + 3, target.y);
        self.words.store_f32(start + 4, target.z);
        self.words.words[start].store(INTERACTION_ACTIVE, Ordering::Release);
    }

    /// Requests the release of the current grab.
    pub fn request_release(&self) {
        let start = self.words.layout.interaction().start;
        self.words.words[start].store(INTERACTION_IDLE, Ordering::Release);
    }
}

/// Simulation side: writes particles, reads the interaction record.
#[derive(Debug)]
pub struct SimulationView {
    words: Words,
}

impl SimulationView {
    pub fn layout(&self) -> SharedLayout {
        self.words.layout
    }

    /// Latest interaction request from the presenter.
    pub fn read_interaction(&self) -> InteractionRecord {
        let start = self.words.layout.interaction().start;
        let active = self.words.words[start].load(Ordering::Acquire) == INTERACTION_ACTIVE;
        let target = self.words.load_vec3(start + 2);
        InteractionRecord {
            active,
            particle: self.words.load(start + 1),
            target: target.to_array(),
        }
    }

    /// Writes the engine's particle state into the buffer.
    pub fn publish(&self, engine: &ClothEngine) {
        let layout = self.words.layout;
        let state = engine.state();
        let n = state.vertex_count.min(layout.vertex_count);
        let pos = layout.positions().start;
        let prev = layout.prev_positions().start;
        let mass = layout.inv_mass().start;
        let flags = layout.collision_flags().start;

        for i in 0..n {
            let p = state.position(i);
            let q = state.prev_position(i);
            for (k, (a, b)) in p.to_array().into_iter().zip(q.to_array()).enumerate() {
                self.words.store_f32(pos + 3 * i + k, a);
                self.words.store_f32(prev + 3 * i + k, b);
            }
            self.words.store_f32(mass + i, state.inv_mass[i]);
            let flag = engine.collision_flags().get(i).copied().unwrap_or(0);
            self.words.store(flags + i, flag as u32);
        }
    }
}

/// Cooperative stop flag shared with the worker thread.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Runs a [`ClothEngine`] on its own thread at a fixed tick.
///
/// Each tick maps the interaction record onto the engine, steps it by the
/// tick length, and publishes. Stopping waits for the tick in flight.
#[derive(Debug)]
pub struct SimulationWorker {
    stop: StopToken,
    handle: Option<JoinHandle<ClothEngine>>,
}

impl SimulationWorker {
    /// Starts the worker thread. The engine moves onto it.
    pub fn spawn(engine: ClothEngine, view: SimulationView, tick: Duration) -> DrapeResult<Self> {
        if tick.is_zero() {
            return Err(DrapeError::InvalidConfig("worker tick must be positive".into()));
        }
        let stop = StopToken::new();
        let token = stop.clone();
        let dt = tick.as_secs_f32();

        let handle = thread::Builder::new()
            .name("drape-sim".into())
            .spawn(move || run(engine, view, tick, dt, token))?;

        tracing::info!(tick_ms = tick.as_secs_f64() * 1e3, "simulation worker started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Token that stops this worker when raised.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the worker and returns the engine, or `None` if the thread
    /// panicked.
    pub fn stop(mut self) -> Option<ClothEngine> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<ClothEngine> {
        self.stop.stop();
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(engine) => {
                tracing::info!(frames = engine.frame(), "simulation worker stopped");
                Some(engine)
            }
            Err(_) => {
                tracing::error!("simulation worker panicked");
                None
            }
        }
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    mut engine: ClothEngine,
    view: SimulationView,
    tick: Duration,
    dt: f32,
    stop: StopToken,
) -> ClothEngine {
    view.publish(&engine);
    while !stop.is_stopped() {
        let started = Instant::now();
        apply_interaction(&mut engine, view.read_interaction());
        engine.step(dt);
        view.publish(&engine);
        if let Some(rest) = tick.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
    engine
}

/// Maps the presenter's record onto begin, update or end.
fn apply_interaction(engine: &mut ClothEngine, record: InteractionRecord) {
    let target = Vec3::from_array(record.target);
    let held = engine.interaction().anchor();
    match (record.active, held) {
        (true, Some(anchor)) if anchor.0 == record.particle => engine.update_interaction(target),
        (true, _) => {
            engine.begin_interaction(ParticleId(record.particle), target);
        }
        (false, Some(_)) => {
            engine.end_interaction(None);
        }
        (false, None) => {}
    }
}
