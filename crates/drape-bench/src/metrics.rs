//! Benchmark metrics: data collected during a benchmark run.

use serde::{Deserialize, Serialize};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Number of frames executed.
    pub frames: u32,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Average wall-clock time per frame (seconds).
    pub avg_step_time: f64,
    pub min_step_time: f64,
    pub max_step_time: f64,
    /// Maximum particle displacement from the initial pose.
    pub max_displacement: f32,
    /// Particles reset by the safety guard (should stay zero).
    pub reset_count: u32,
    /// Body and floor corrections over the run.
    pub body_contacts: u64,
    /// Self-collision corrections over the run.
    pub self_contacts: u64,
    /// Particles deeper than 1 mm inside the body at the end.
    pub penetrating_vertices: u32,
    pub max_penetration: f32,
    pub avg_penetration: f32,
    /// Whether every position was finite at the end.
    pub finite: bool,
}

impl BenchmarkMetrics {
    /// CSV header row.
    pub fn to_csv_header() -> String {
        "scenario,vertex_count,triangle_count,frames,total_wall_time_s,avg_step_ms,min_step_ms,max_step_ms,max_displacement,reset_count,body_contacts,self_contacts,penetrating_vertices,max_penetration,avg_penetration,finite".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.6},{},{},{},{},{:.6},{:.6},{}",
            self.scenario,
            self.vertex_count,
            self.triangle_count,
            self.frames,
            self.total_wall_time,
            self.avg_step_time * 1000.0,
            self.min_step_time * 1000.0,
            self.max_step_time * 1000.0,
            self.max_displacement,
            self.reset_count,
            self.body_contacts,
            self.self_contacts,
            self.penetrating_vertices,
            self.max_penetration,
            self.avg_penetration,
            self.finite,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}
