//! Benchmark runner: builds an engine for a scenario, steps it, and
//! collects metrics.

use std::time::Instant;

use drape_engine::ClothEngine;
use drape_math::Vec3;
use drape_types::DrapeResult;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Run a single scenario to completion.
    pub fn run(scenario: &Scenario) -> DrapeResult<BenchmarkMetrics> {
        let mut engine = ClothEngine::initialize(
            &scenario.cloth,
            &scenario.body,
            scenario.config.clone(),
            &scenario.pin,
        )?;

        // Initial pose after projection out of the body.
        let initial: Vec<Vec3> = (0..engine.state().vertex_count)
            .map(|i| engine.state().position(i))
            .collect();

        let mut step_times: Vec<f64> = Vec::with_capacity(scenario.frames as usize);
        let mut reset_count = 0u32;
        let mut body_contacts = 0u64;
        let mut self_contacts = 0u64;
        let mut grab_origin = None;

        let total_start = Instant::now();

        for frame in 0..scenario.frames {
            if let Some(script) = &scenario.grab {
                if frame == script.begin_frame {
                    let origin = engine.state().position(script.particle.index());
                    if engine.begin_interaction(script.particle, origin) {
                        grab_origin = Some(origin);
                    }
                } else if frame == script.end_frame {
                    engine.end_interaction(None);
                    grab_origin = None;
                } else if let Some(origin) = grab_origin {
                    engine.update_interaction(script.target(origin, frame));
                }
            }

            let report = engine.step(scenario.frame_dt);
            step_times.push(report.wall_time);
            reset_count += report.reset.len() as u32;
            body_contacts += (report.body.resolved + report.floor.resolved) as u64;
            self_contacts += report.self_contacts.resolved as u64;
        }

        let total_wall_time = total_start.elapsed().as_secs_f64();

        let max_displacement = initial
            .iter()
            .enumerate()
            .map(|(i, &p0)| (engine.state().position(i) - p0).length())
            .fold(0.0f32, f32::max);

        let avg_step = if step_times.is_empty() {
            0.0
        } else {
            step_times.iter().sum::<f64>() / step_times.len() as f64
        };
        let min_step = step_times.iter().copied().fold(f64::MAX, f64::min);
        let max_step = step_times.iter().copied().fold(0.0, f64::max);

        let diagnostics = engine.diagnostics();
        tracing::debug!(
            scenario = scenario.kind.name(),
            wall_time = total_wall_time,
            penetrating = diagnostics.penetrating_vertex_count,
            "benchmark finished"
        );

        Ok(BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            vertex_count: scenario.cloth.vertex_count(),
            triangle_count: scenario.cloth.triangle_count(),
            frames: scenario.frames,
            total_wall_time,
            avg_step_time: avg_step,
            min_step_time: if step_times.is_empty() { 0.0 } else { min_step },
            max_step_time: max_step,
            max_displacement,
            reset_count,
            body_contacts,
            self_contacts,
            penetrating_vertices: diagnostics.penetrating_vertex_count,
            max_penetration: diagnostics.max_penetration_depth,
            avg_penetration: diagnostics.avg_penetration_depth,
            finite: engine.state().is_finite(),
        })
    }

    /// Run every scenario, each with its own configuration.
    pub fn run_all() -> DrapeResult<Vec<BenchmarkMetrics>> {
        ScenarioKind::all()
            .iter()
            .map(|&kind| Self::run(&Scenario::from_kind(kind)))
            .collect()
    }
}
