//! CLI command implementations.

use std::error::Error;
use std::time::Instant;

use drape_bench::metrics::BenchmarkMetrics;
use drape_bench::runner::BenchmarkRunner;
use drape_bench::scenarios::{Scenario, ScenarioKind};
use drape_engine::ClothEngine;
use drape_io::{validate_input, SimulationInput, SimulationMetrics, SimulationOutput};
use drape_mesh::TriangleMesh;
use drape_solver::SimulationConfig;

type CliResult = Result<(), Box<dyn Error>>;

fn load_config(path: &str) -> Result<SimulationConfig, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)?;
    let config: SimulationConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Run a simulation from an input file.
pub fn simulate(input_path: &str, config_path: Option<&str>, output_path: Option<&str>) -> CliResult {
    println!("drape Simulation");
    println!("────────────────");
    println!("Input: {input_path}");

    let content = std::fs::read_to_string(input_path)?;
    let mut input: SimulationInput = serde_json::from_str(&content)?;
    if let Some(path) = config_path {
        println!("Config: {path}");
        input.config = load_config(path)?;
    }
    validate_input(&input)?;
    println!();

    let mut engine = ClothEngine::initialize(&input.cloth, &input.body, input.config.clone(), &input.pin)?;
    let initial = engine.positions();

    println!(
        "Running: {} verts, {} tris, {} frames at {:.4}s",
        input.cloth.vertex_count(),
        input.cloth.triangle_count(),
        input.frames,
        input.frame_dt,
    );

    let start = Instant::now();
    let mut reset_count = 0u32;
    for _ in 0..input.frames {
        reset_count += engine.step(input.frame_dt).reset.len() as u32;
    }
    let wall_time = start.elapsed().as_secs_f64();

    let mut draped = input.cloth.clone();
    let positions = engine.positions();
    for (i, p) in positions.chunks_exact(3).enumerate() {
        draped.pos_x[i] = p[0];
        draped.pos_y[i] = p[1];
        draped.pos_z[i] = p[2];
    }
    let max_displacement = positions
        .chunks_exact(3)
        .zip(initial.chunks_exact(3))
        .map(|(a, b)| {
            let (dx, dy, dz) = (a[0] - b[0], a[1] - b[1], a[2] - b[2]);
            (dx * dx + dy * dy + dz * dz).sqrt()
        })
        .fold(0.0f32, f32::max);

    let diagnostics = engine.diagnostics();
    let output = SimulationOutput {
        draped,
        collision_flags: engine.collision_flags().to_vec(),
        metrics: SimulationMetrics {
            wall_time_seconds: wall_time,
            frame_count: input.frames,
            reset_count,
            penetrating_vertices: diagnostics.penetrating_vertex_count,
            max_penetration: diagnostics.max_penetration_depth,
            max_displacement,
        },
    };

    println!("  Wall time:     {:.3}s", wall_time);
    println!("  Avg frame:     {:.3}ms", wall_time * 1000.0 / input.frames as f64);
    println!("  Max displace:  {:.4}m", max_displacement);
    println!(
        "  Penetrating:   {}/{} (max {:.4}m)",
        diagnostics.penetrating_vertex_count,
        diagnostics.total_vertices,
        diagnostics.max_penetration_depth,
    );
    println!("  Safety resets: {reset_count}");
    println!();

    if let Some(path) = output_path {
        std::fs::write(path, serde_json::to_string_pretty(&output)?)?;
        println!("Result written to: {path}");
    }

    Ok(())
}

/// Run benchmark suite.
pub fn benchmark(scenario_name: &str, output_path: Option<&str>, config_path: Option<&str>) -> CliResult {
    println!("drape Benchmark Suite");
    println!("═════════════════════");
    println!();

    let config = config_path.map(load_config).transpose()?;

    let scenarios: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        vec![scenario_name.parse()?]
    };

    let mut all_metrics = Vec::new();

    for &kind in &scenarios {
        let mut scenario = Scenario::from_kind(kind);
        if let Some(config) = &config {
            scenario = scenario.with_config(config.clone());
        }

        println!(
            "Running: {} ({} verts, {} tris, {} frames)",
            kind.name(),
            scenario.cloth.vertex_count(),
            scenario.cloth.triangle_count(),
            scenario.frames,
        );

        let metrics = BenchmarkRunner::run(&scenario).map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg frame:     {:.3}ms", metrics.avg_step_time * 1000.0);
        println!("  Max displace:  {:.4}m", metrics.max_displacement);
        println!("  Penetrating:   {} (max {:.4}m)", metrics.penetrating_vertices, metrics.max_penetration);
        println!("  Safety resets: {}", metrics.reset_count);
        println!();

        all_metrics.push(metrics);
    }

    let csv = BenchmarkMetrics::to_csv(&all_metrics);
    if let Some(path) = output_path {
        std::fs::write(path, &csv)?;
        println!("Results written to: {path}");
    } else {
        println!("CSV Output:");
        println!("{csv}");
    }

    Ok(())
}

/// Validate a config, mesh or simulation input.
pub fn validate(path: &str) -> CliResult {
    println!("drape Validator");
    println!("───────────────");
    println!();

    if path.ends_with(".toml") {
        println!("Validating config: {path}");
        load_config(path)?;
        println!("✅ Config is valid.");
    } else if path.ends_with(".json") {
        let content = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        if value.get("cloth").is_some() {
            println!("Validating simulation input: {path}");
            let input: SimulationInput = serde_json::from_value(value)?;
            match validate_input(&input) {
                Ok(()) => println!(
                    "✅ Input is valid ({} cloth verts, {} body tris, {} frames).",
                    input.cloth.vertex_count(),
                    input.body.triangle_count(),
                    input.frames
                ),
                Err(e) => return Err(format!("❌ Input validation failed: {e}").into()),
            }
        } else {
            println!("Validating mesh: {path}");
            let mesh: TriangleMesh = serde_json::from_value(value)?;
            match mesh.validate() {
                Ok(()) => println!(
                    "✅ Mesh is valid ({} verts, {} tris).",
                    mesh.vertex_count(),
                    mesh.triangle_count()
                ),
                Err(e) => return Err(format!("❌ Mesh validation failed: {e}").into()),
            }
        }
    } else {
        return Err("Unsupported file format. Use .toml (config) or .json (mesh or input).".into());
    }

    Ok(())
}
