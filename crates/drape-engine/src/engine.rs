//! The cloth engine: owns every stage and runs the substep pipeline.
//!
//! Each frame:
//! 1. **Clamp**: reject bad timesteps, cap at `max_frame_dt`
//! 2. **Substeps**: integrate, structural, bending, interaction, stretch
//!    limits, floor, body passes, self-collision
//! 3. **Guard**: reset particles that went non-finite or out of bounds
//! 4. **Report**: emit telemetry and hand back a [`StepReport`]

use std::time::Instant;

use drape_contact::{BodyCollider, ContactReport, FloorPlane, SelfCollisionSystem};
use drape_math::{Affine3A, Vec3};
use drape_mesh::topology::{BoundaryRing, Topology};
use drape_mesh::TriangleMesh;
use drape_solver::integrator::{guard_state, integrate};
use drape_solver::{ConstraintSet, InteractionConstraint, PhysicsState, PinRule, SimulationConfig};
use drape_telemetry::{EventBus, EventKind, SimulationEvent};
use drape_types::constants::DEFAULT_FRAME_DT;
use drape_types::{DrapeError, DrapeResult, ParticleId};
use serde::{Deserialize, Serialize};

use crate::diagnostics::{self, Diagnostics};

/// Summary of one [`ClothEngine::step`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Frame counter after this step.
    pub frame: u64,
    /// Clamped frame timestep actually simulated (seconds).
    pub dt: f32,
    pub substeps: u32,
    /// True if the timestep was rejected and nothing moved.
    pub skipped: bool,
    /// Body contacts, summed over substeps and passes.
    pub body: ContactReport,
    pub floor: ContactReport,
    pub self_contacts: ContactReport,
    /// Particles reset by the safety guard.
    pub reset: Vec<ParticleId>,
    /// Wall-clock time for the step (seconds).
    pub wall_time: f64,
}

/// Real-time cloth simulation of one garment over one body.
pub struct ClothEngine {
    config: SimulationConfig,
    state: PhysicsState,
    topology: Topology,
    collar: BoundaryRing,
    constraints: ConstraintSet,
    body: BodyCollider,
    floor: Option<FloorPlane>,
    self_collision: Option<SelfCollisionSystem>,
    interaction: InteractionConstraint,
    collision_flags: Vec<u8>,
    frame: u64,
    substep_dt: f32,
    bus: Option<EventBus>,
}

impl ClothEngine {
    /// Builds an engine for `cloth` draped over the triangle mesh `body`.
    ///
    /// Any failure (bad mesh, bad config, degenerate body) is reported as
    /// [`DrapeError::SimulationUnavailable`].
    pub fn initialize(
        cloth: &TriangleMesh,
        body: &TriangleMesh,
        config: SimulationConfig,
        pin: &PinRule,
    ) -> DrapeResult<Self> {
        let collider = BodyCollider::from_mesh(body, &config).map_err(unavailable)?;
        Self::with_collider(cloth, collider, config, pin)
    }

    /// Like [`ClothEngine::initialize`], but over a prebuilt collider.
    pub fn with_collider(
        cloth: &TriangleMesh,
        body: BodyCollider,
        config: SimulationConfig,
        pin: &PinRule,
    ) -> DrapeResult<Self> {
        Self::build(cloth, body, config, |mesh, collar| Ok(pin.mask(mesh, collar)))
    }

    /// Builds an engine with a custom pin predicate.
    pub fn initialize_with(
        cloth: &TriangleMesh,
        body: BodyCollider,
        config: SimulationConfig,
        predicate: impl Fn(ParticleId, Vec3) -> bool,
    ) -> DrapeResult<Self> {
        Self::build(cloth, body, config, |mesh, _| {
            Ok((0..mesh.vertex_count())
                .map(|i| predicate(ParticleId(i as u32), mesh.position_vec3(i)))
                .collect())
        })
    }

    fn build(
        cloth: &TriangleMesh,
        body: BodyCollider,
        config: SimulationConfig,
        pins: impl FnOnce(&TriangleMesh, &BoundaryRing) -> DrapeResult<Vec<bool>>,
    ) -> DrapeResult<Self> {
        Self::assemble(cloth, body, config, pins).map_err(|e| {
            tracing::warn!(error = %e, "cloth engine unavailable");
            unavailable(e)
        })
    }

    fn assemble(
        cloth: &TriangleMesh,
        body: BodyCollider,
        config: SimulationConfig,
        pins: impl FnOnce(&TriangleMesh, &BoundaryRing) -> DrapeResult<Vec<bool>>,
    ) -> DrapeResult<Self> {
        config.validate()?;
        cloth.validate()?;

        let topology = Topology::build(cloth);
        let collar = topology.detect_boundary_ring(cloth, config.collar_tolerance);
        let mask = pins(cloth, &collar)?;
        let mut state = PhysicsState::initialize(cloth, |id, _| {
            mask.get(id.index()).copied().unwrap_or(false)
        })?;

        // Start every free particle outside the body.
        let mut projected = 0usize;
        for i in 0..state.vertex_count {
            if state.is_pinned(i) {
                continue;
            }
            let p = state.position(i);
            let safe = body.resolve_point(p);
            if safe != p {
                state.place_at_rest(i, safe);
                projected += 1;
            }
        }

        let constraints = ConstraintSet::build(&topology, &state, &collar);
        let self_collision = config.self_collision.then(|| {
            SelfCollisionSystem::new(
                &topology,
                config.self_collision_thickness,
                config.self_collision_stiffness,
            )
        });
        let floor = config.floor_height.map(FloorPlane::new);

        tracing::info!(
            particles = state.vertex_count,
            pinned = state.vertex_count - state.free_count(),
            structural = constraints.structural.len(),
            bending = constraints.bending.len(),
            collar = collar.len(),
            projected,
            body = body.surface_name(),
            "cloth engine initialized"
        );

        Ok(Self {
            collision_flags: vec![0; state.vertex_count],
            substep_dt: DEFAULT_FRAME_DT / config.substeps as f32,
            config,
            state,
            topology,
            collar,
            constraints,
            body,
            floor,
            self_collision,
            interaction: InteractionConstraint::new(),
            frame: 0,
            bus: None,
        })
    }

    /// Attaches a telemetry bus.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn event_bus_mut(&mut self) -> Option<&mut EventBus> {
        self.bus.as_mut()
    }

    /// Advances the simulation by one frame of length `dt`.
    ///
    /// Non-finite or non-positive `dt` is ignored. Longer frames are
    /// clamped to `max_frame_dt`.
    pub fn step(&mut self, dt: f32) -> StepReport {
        if !dt.is_finite() || dt <= 0.0 {
            tracing::debug!(dt, "ignoring invalid timestep");
            return StepReport {
                frame: self.frame,
                skipped: true,
                ..StepReport::default()
            };
        }

        let start = Instant::now();
        let dt = dt.min(self.config.max_frame_dt);
        let substeps = self.config.substeps.max(1);
        let sdt = dt / substeps as f32;
        self.substep_dt = sdt;
        self.collision_flags.fill(0);
        self.emit(EventKind::FrameBegin { dt, substeps });

        let accel = self.config.external_acceleration();
        let mut report = StepReport {
            dt,
            substeps,
            ..StepReport::default()
        };

        for _ in 0..substeps {
            integrate(&mut self.state, sdt, accel, self.config.drag, self.config.max_speed);

            self.constraints
                .solve_structural(&mut self.state, self.config.structural_compliance, sdt);
            self.constraints
                .solve_bending(&mut self.state, self.config.bending_compliance, sdt);
            self.interaction
                .solve(&mut self.state, self.config.interaction_compliance, sdt);

            if self.config.stretch_limits {
                self.constraints.enforce_stretch_limits(
                    &mut self.state,
                    self.config.stretch_limit,
                    self.config.collar_stretch_limit,
                );
            }

            if let Some(floor) = &self.floor {
                report.floor.merge(floor.resolve(&mut self.state));
            }

            for _ in 0..self.config.body_passes {
                report
                    .body
                    .merge(self.body.solve(&mut self.state, &mut self.collision_flags));
            }

            if let Some(sc) = &mut self.self_collision {
                report.self_contacts.merge(sc.solve(&mut self.state));
            }
        }

        report.reset = guard_state(&mut self.state, self.config.safety_bound);
        if !report.reset.is_empty() {
            tracing::warn!(
                frame = self.frame,
                count = report.reset.len(),
                first = %report.reset[0],
                "particles reset to rest position"
            );
            self.emit(EventKind::StateReset {
                particles: report.reset.iter().map(|id| id.0).collect(),
            });
        }

        self.interaction.advance(dt);

        self.emit(EventKind::BodyContacts {
            resolved: report.body.resolved + report.floor.resolved,
            deep: report.body.deep,
            max_correction: report.body.max_correction.max(report.floor.max_correction),
        });
        self.emit(EventKind::SelfContacts {
            pairs: report.self_contacts.resolved,
        });

        report.wall_time = start.elapsed().as_secs_f64();
        self.emit(EventKind::FrameEnd {
            wall_time: report.wall_time,
        });
        if let Some(bus) = &mut self.bus {
            bus.flush();
        }

        self.frame += 1;
        report.frame = self.frame;
        report
    }

    // ─── Interaction ─────────────────────────────────────────

    /// Grabs `particle` (and free neighbours within the grab radius).
    ///
    /// The target is clamped outside the body. Returns false if the
    /// particle is pinned or out of range.
    pub fn begin_interaction(&mut self, particle: ParticleId, target: Vec3) -> bool {
        if !target.is_finite() {
            return false;
        }
        let target = self.body.resolve_point(target);
        let started = self
            .interaction
            .begin(&self.state, particle, target, self.config.grab_radius);
        if started {
            let members = self.interaction.members().len() as u32;
            self.emit(EventKind::InteractionBegin {
                particle: particle.0,
                members,
            });
        }
        started
    }

    /// Moves the grab target. No-op while idle.
    pub fn update_interaction(&mut self, target: Vec3) {
        if !target.is_finite() || !self.interaction.is_active() {
            return;
        }
        let target = self.body.resolve_point(target);
        self.interaction.update_target(target);
    }

    /// Releases the grab, throwing the cloth with `hint` or the estimated
    /// drag velocity. Returns false if nothing was held.
    pub fn end_interaction(&mut self, hint: Option<Vec3>) -> bool {
        let anchor = self.interaction.anchor();
        let Some(velocity) = self.interaction.end(
            &mut self.state,
            hint,
            self.config.max_throw_speed,
            self.substep_dt,
        ) else {
            return false;
        };
        let particle = anchor.map_or(u32::MAX, |id| id.0);
        self.emit(EventKind::InteractionEnd {
            particle,
            throw_speed: velocity.length(),
        });
        true
    }

    pub fn interaction(&self) -> &InteractionConstraint {
        &self.interaction
    }

    // ─── Body ────────────────────────────────────────────────

    /// Moves the body rigidly. Cloth catches up on the next step.
    pub fn set_body_transform(&mut self, transform: Affine3A) {
        self.body.set_transform(transform);
    }

    pub fn body(&self) -> &BodyCollider {
        &self.body
    }

    /// Penetration snapshot of the current state. Does not move anything.
    pub fn diagnostics(&self) -> Diagnostics {
        let d = diagnostics::measure(&self.state, &self.body);
        if let Some(bus) = &self.bus {
            bus.emit(SimulationEvent::new(
                self.frame,
                EventKind::Diagnostics {
                    penetrating: d.penetrating_vertex_count,
                    total: d.total_vertices,
                    avg_depth: d.avg_penetration_depth,
                    max_depth: d.max_penetration_depth,
                },
            ));
        }
        d
    }

    // ─── Accessors ───────────────────────────────────────────

    pub fn state(&self) -> &PhysicsState {
        &self.state
    }

    /// Interleaved copy of the current positions.
    pub fn positions(&self) -> Vec<f32> {
        self.state.positions_interleaved()
    }

    /// Writes current positions into an interleaved host buffer.
    pub fn sync_to(&self, target: &mut [f32]) -> DrapeResult<()> {
        self.state.sync_to(target)
    }

    /// Per-particle collision flags for the last frame.
    pub fn collision_flags(&self) -> &[u8] {
        &self.collision_flags
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn collar(&self) -> &BoundaryRing {
        &self.collar
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn emit(&self, kind: EventKind) {
        if let Some(bus) = &self.bus {
            bus.emit(SimulationEvent::new(self.frame, kind));
        }
    }
}

impl std::fmt::Debug for ClothEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClothEngine")
            .field("particles", &self.state.vertex_count)
            .field("frame", &self.frame)
            .field("body", &self.body)
            .field("interaction", &self.interaction.is_active())
            .finish()
    }
}

fn unavailable(e: DrapeError) -> DrapeError {
    match e {
        DrapeError::SimulationUnavailable(_) => e,
        other => DrapeError::SimulationUnavailable(other.to_string()),
    }
}
