use std::fs;
use std::path::PathBuf;

use clap::Parser;
use erosion_sim_core::{load_capture, output_file_name, run_capture, save_capture, CaptureError};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Replay a captured erosion history on the CPU reference pipeline
#[derive(Parser, Debug)]
#[command(name = "sim-validator")]
#[command(about = "CPU reference validator for captured erosion simulations", long_about = None)]
struct Args {
    /// Captured data JSON file from the GPU application
    input_file: PathBuf,

    /// Directory the result document is written into (created if missing)
    results_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn replay(args: &Args) -> Result<PathBuf, CaptureError> {
    let input = load_capture(&args.input_file)?;
    let output = run_capture(&input)?;

    fs::create_dir_all(&args.results_dir)
        .map_err(|e| CaptureError::SaveFailed(e.to_string()))?;
    let output_path = args.results_dir.join(output_file_name(&args.input_file));
    save_capture(&output, &output_path)?;

    println!(
        "Replayed {} command(s), {} frame(s) captured",
        output.history.len(),
        output.data.len()
    );
    Ok(output_path)
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    println!("=== Initializing Simulation from Capture File ===\n");

    match replay(&args) {
        Ok(output_path) => {
            println!("\n=== Simulation Complete ===");
            println!("Reference output saved to '{}'", output_path.display());
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
