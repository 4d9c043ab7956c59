//! # drape-bench
//!
//! Benchmark suite for the drape cloth engine.
//!
//! Provides four procedural scenarios, metric collection, and CSV export
//! for regression tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{GrabScript, Scenario, ScenarioKind};
