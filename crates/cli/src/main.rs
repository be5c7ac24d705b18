//! U-Boxfill command-line runner

mod request;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use request::{ConfigOverrides, SolveRequest, SolveResponse};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use u_boxfill_core::BoxFiller;

#[derive(Parser)]
#[command(name = "u-boxfill")]
#[command(about = "Fill a walled grid with boxes using a genetic search over box orderings")]
#[command(version)]
struct Cli {
    /// Log per-generation progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the search for a JSON request file
    Solve {
        /// Path to the JSON request
        request: PathBuf,

        /// Population size (overrides the request config)
        #[arg(short, long)]
        population_size: Option<usize>,

        /// Number of generations (overrides the request config)
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Per-position mutation probability (overrides the request config)
        #[arg(short, long)]
        mutation_probability: Option<f64>,

        /// Random seed for reproducible runs
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output file for the result (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the shape and box list of a request without solving
    Render {
        /// Path to the JSON request
        request: PathBuf,
    },
}

fn load_request(path: &Path) -> anyhow::Result<SolveRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid request in {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Solve {
            request,
            population_size,
            iterations,
            mutation_probability,
            seed,
            output,
        } => {
            let req = load_request(&request)?;
            let shape = req.shape.to_layout()?;
            let config = ConfigOverrides {
                population_size,
                iterations,
                mutation_probability,
            }
            .apply(req.config);

            let filler = BoxFiller::new(config);
            let result = match seed {
                Some(seed) => {
                    filler.solve_with_rng(&shape, &req.boxes, &mut StdRng::seed_from_u64(seed))?
                }
                None => filler.solve(&shape, &req.boxes)?,
            };

            println!("{}", result.layout);
            println!();
            println!(
                "Placed {}/{} boxes in {} ms",
                result.placed_count(),
                req.boxes.len(),
                result.computation_time_ms
            );
            println!("Fill factor: {:.4}", result.fill_factor);

            if let Some(path) = output {
                let response = SolveResponse::from(result);
                let json = serde_json::to_string_pretty(&response)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Results saved to: {}", path.display());
            }
        }

        Commands::Render { request } => {
            let req = load_request(&request)?;
            let shape = req.shape.to_layout()?;
            println!("{}", shape);
            println!();
            println!(
                "{}x{} grid, {} wall cells",
                shape.width(),
                shape.height(),
                shape.count(u_boxfill_core::CellState::Wall)
            );
            if req.boxes.is_empty() {
                println!("No boxes");
            } else {
                let listed: Vec<String> = req.boxes.iter().map(ToString::to_string).collect();
                println!("Boxes: {}", listed.join(", "));
            }
        }
    }

    Ok(())
}
