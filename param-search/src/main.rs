//! Random search for erosion parameters hitting a target erosion rate.
//!
//! Drives the reference pipeline through the same two interfaces the
//! validator uses (apply parameters, step, read metrics) and scores each
//! trial by how close the run lands to the requested share of terrain
//! eroded. The sampler is seeded, so a search is reproducible end to end.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use erosion_sim_core::{ErosionSimulation, FieldMetrics, SimulationParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

/// Search erosion parameters for a target erosion percentage
#[derive(Parser, Debug)]
#[command(name = "param-search")]
#[command(about = "Randomized parameter search over the CPU erosion model", long_about = None)]
struct Args {
    /// Number of parameter sets to evaluate
    #[arg(short, long, default_value_t = 50)]
    trials: u32,

    /// Seed for the parameter sampler
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Target share of mean terrain height eroded, in percent
    #[arg(long, default_value_t = 5.0)]
    target_erosion: f64,

    /// Steps simulated per trial
    #[arg(short, long, default_value_t = 100)]
    iterations: u32,

    /// Grid edge length used for search runs
    #[arg(short, long, default_value_t = 64)]
    grid_size: usize,

    /// Output file for the best parameter set
    #[arg(short, long, default_value = "optimized_params.json")]
    output: PathBuf,
}

/// One sampled parameter set
#[derive(Debug, Clone, Copy)]
struct Candidate {
    solubility: f32,
    capacity_factor: f32,
    density: f32,
    deposition_rate: f32,
}

impl Candidate {
    /// Draw a candidate from the search space.
    ///
    /// Solubility spans two decades, so it is sampled log-uniform; the
    /// other three dimensions are plain uniform ranges.
    fn sample(rng: &mut StdRng) -> Self {
        Self {
            solubility: 10.0_f32.powf(rng.random_range(-3.0_f32..-1.0)),
            capacity_factor: rng.random_range(0.01_f32..1.0),
            density: rng.random_range(1.0_f32..50.0),
            deposition_rate: rng.random_range(0.1_f32..0.9),
        }
    }
}

/// Outcome of evaluating one candidate
#[derive(Debug, Clone, Copy)]
struct Evaluation {
    candidate: Candidate,
    erosion_pct: f64,
    loss: f64,
}

/// Run the erosion pipeline under a candidate and measure terrain loss.
///
/// Base parameters are fixed so trials only differ in the four searched
/// dimensions; the terrain ramp is scaled to the grid size to keep slopes
/// comparable across grid sizes.
fn evaluate(candidate: Candidate, args: &Args) -> Evaluation {
    let params = SimulationParams {
        grid_size: args.grid_size,
        height_multiplier: args.grid_size as f32,
        rain_amount: 0.001,
        evap_rate: 0.01,
        dt: 0.01,
        min_slope: 0.01,
        velocity_damping: 0.99,
        add_rain: true,
        solubility: candidate.solubility,
        capacity_factor: candidate.capacity_factor,
        density: candidate.density,
        deposition_rate: candidate.deposition_rate,
        ..SimulationParams::default()
    };

    let mut sim = ErosionSimulation::new(params);
    let initial_avg = FieldMetrics::from_slice(sim.state().terrain.as_slice()).avg;
    if initial_avg == 0.0 {
        // Flat terrain cannot erode; score the trial out of contention
        return Evaluation {
            candidate,
            erosion_pct: 0.0,
            loss: 1e6,
        };
    }

    for _ in 0..args.iterations {
        sim.step();
    }

    let final_avg = FieldMetrics::from_slice(sim.state().terrain.as_slice()).avg;
    let erosion_pct = (initial_avg - final_avg) / initial_avg * 100.0;
    Evaluation {
        candidate,
        erosion_pct,
        loss: (erosion_pct - args.target_erosion).abs(),
    }
}

fn main() {
    let args = Args::parse();

    println!("=== Parameter Search ===");
    println!(
        "Target: erode {:.1}% of average height in {} iterations on a {}x{} grid",
        args.target_erosion, args.iterations, args.grid_size, args.grid_size
    );
    println!(
        "Search space: solubility, capacityFactor, density, depositionRate ({} trials, seed {})",
        args.trials, args.seed
    );
    println!("{}", "-".repeat(40));

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut best: Option<Evaluation> = None;

    for trial in 1..=args.trials {
        let result = evaluate(Candidate::sample(&mut rng), &args);
        let c = result.candidate;
        println!(
            "[{:>3}/{}] sol={:.4} cap={:.2} dens={:.2} depo={:.2} -> erosion {:.2}%, loss {:.4}",
            trial,
            args.trials,
            c.solubility,
            c.capacity_factor,
            c.density,
            c.deposition_rate,
            result.erosion_pct,
            result.loss
        );

        if best.is_none_or(|b| result.loss < b.loss) {
            best = Some(result);
        }
    }

    let Some(best) = best else {
        eprintln!("No trials were run");
        std::process::exit(1);
    };

    println!("\n=== Search Complete ===");
    println!("Best loss: {:.4} (erosion {:.2}%)", best.loss, best.erosion_pct);
    println!("Best parameters found:");
    println!("  solubility      = {:.6}", best.candidate.solubility);
    println!("  capacityFactor  = {:.4}", best.candidate.capacity_factor);
    println!("  density         = {:.4}", best.candidate.density);
    println!("  depositionRate  = {:.4}", best.candidate.deposition_rate);

    // Shaped to drop into the 'erosion' section of the app's config
    let output = json!({
        "solubility": best.candidate.solubility,
        "deposition": best.candidate.deposition_rate,
        "capacity": best.candidate.capacity_factor,
        "density": best.candidate.density,
    });
    match serde_json::to_string_pretty(&output)
        .map_err(|e| e.to_string())
        .and_then(|text| fs::write(&args.output, text).map_err(|e| e.to_string()))
    {
        Ok(()) => println!("\nOptimized parameters saved to '{}'", args.output.display()),
        Err(e) => {
            eprintln!("Failed to save '{}': {}", args.output.display(), e);
            std::process::exit(1);
        }
    }
}
