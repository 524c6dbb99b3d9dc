use std::path::PathBuf;

use clap::Parser;
use erosion_sim_core::{
    compare_documents, load_metrics_document, ComparisonReport, MetricComparison, Severity,
};

// ANSI color codes for terminal output
const HEADER: &str = "\x1b[95m";
const FRAME: &str = "\x1b[1m\x1b[94m";
const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// Compare GPU and CPU erosion simulation outputs
#[derive(Parser, Debug)]
#[command(name = "sim-compare")]
#[command(about = "Frame-by-frame comparison of two erosion result documents", long_about = None)]
struct Args {
    /// Result document captured from the GPU application
    gpu_file: PathBuf,

    /// Result document produced by sim-validator
    cpu_file: PathBuf,
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Ok => GREEN,
        Severity::Warning => YELLOW,
        Severity::Fail => RED,
        Severity::NotApplicable => "",
    }
}

fn print_metric(metric: &MetricComparison) {
    match (
        metric.reference,
        metric.candidate,
        metric.absolute_diff,
        metric.relative_pct,
    ) {
        (Some(gpu), Some(cpu), Some(diff), Some(rel)) => {
            let color = severity_color(metric.severity);
            println!(
                "{:<35} | {}{:>12.4} | {:>12.4} | {:>10.4} | {:>9.2}%{}",
                metric.key, color, gpu, cpu, diff, rel, RESET
            );
        }
        (gpu, cpu, _, _) => {
            let gpu = gpu.map_or_else(|| "None".to_string(), |v| format!("{v:.4}"));
            let cpu = cpu.map_or_else(|| "None".to_string(), |v| format!("{v:.4}"));
            println!(
                "{:<35} | {:>12} | {:>12} | {:>10} | {:>10}",
                metric.key, gpu, cpu, "N/A", "N/A"
            );
        }
    }
}

fn print_report(report: &ComparisonReport) {
    if report.frame_count_mismatch() {
        println!(
            "{}Warning: Frame counts differ. GPU: {}, CPU: {}. Comparing up to the shorter length.{}",
            YELLOW, report.reference_frames, report.candidate_frames, RESET
        );
    }

    println!("{}{}\n{:^80}\n{}{}", HEADER, "=".repeat(80), "Simulation Comparison", "=".repeat(80), RESET);
    println!(
        "{:<35} | {:>12} | {:>12} | {:>10} | {:>10}",
        "METRIC KEY", "GPU VALUE", "CPU VALUE", "ABSOLUTE", "REL. DIFF"
    );
    println!("{}", "-".repeat(80));

    for frame in &report.frames {
        println!("\n{}--- FRAME {} ---{}", FRAME, frame.frame, RESET);
        for metric in &frame.metrics {
            print_metric(metric);
        }
    }
}

fn main() {
    let args = Args::parse();

    let gpu = match load_metrics_document(&args.gpu_file) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{}Error reading '{}': {}{}", RED, args.gpu_file.display(), e, RESET);
            std::process::exit(1);
        }
    };
    let cpu = match load_metrics_document(&args.cpu_file) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{}Error reading '{}': {}{}", RED, args.cpu_file.display(), e, RESET);
            std::process::exit(1);
        }
    };

    let report = compare_documents(&gpu, &cpu);
    print_report(&report);

    let mut warnings = 0_usize;
    let mut failures = 0_usize;
    for frame in &report.frames {
        for metric in &frame.metrics {
            match metric.severity {
                Severity::Warning => warnings += 1,
                Severity::Fail => failures += 1,
                Severity::Ok | Severity::NotApplicable => {}
            }
        }
    }

    println!("\n{}", "=".repeat(80));
    println!(
        "Compared {} frame(s): {} warning(s), {} failure(s)",
        report.frames.len(),
        warnings,
        failures
    );
    if failures > 0 {
        println!("{}COMPARISON FAILED: pipelines have diverged beyond tolerance{}", RED, RESET);
        std::process::exit(1);
    }
    println!("{}Simulations agree within tolerance{}", GREEN, RESET);
}
