//! drape CLI: simulation, benchmarking, and validation.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "drape")]
#[command(version, about = "drape: real-time cloth draping over rigid bodies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from an input file.
    Simulate {
        /// Simulation input (JSON: cloth, body, pin, config, frames).
        #[arg(short, long)]
        input: String,

        /// Config override (TOML). Replaces the config inside the input.
        #[arg(short, long)]
        config: Option<String>,

        /// Write the draped result here (JSON).
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run benchmark suite.
    Benchmark {
        /// Which scenario to run (hanging_sheet, sphere_drape, tube_on_cylinder, grab_and_release, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Output CSV file path.
        #[arg(short, long)]
        output: Option<String>,

        /// Config for every scenario (TOML).
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Validate a config, mesh or simulation input.
    Validate {
        /// Path to a .toml config or a .json mesh/input.
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            input,
            config,
            output,
        } => commands::simulate(&input, config.as_deref(), output.as_deref()),
        Commands::Benchmark {
            scenario,
            output,
            config,
        } => commands::benchmark(&scenario, output.as_deref(), config.as_deref()),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
