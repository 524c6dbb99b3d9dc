//! Hydraulic Erosion Reference Library
//!
//! A CPU reference implementation of the six-pass hydraulic erosion
//! pipeline, used as ground truth when validating the GPU-resident
//! simulation. Given the same recorded command history, this model must
//! reproduce the GPU run's per-pass summary statistics within the
//! validation tolerance.
//!
//! ## Layers
//!
//! - [`passes`]: the six grid update passes, the only real numerics here
//! - [`simulation`]: fixed-order stepping with per-pass metric capture
//! - [`capture`]: replaying recorded command histories from JSON files
//! - [`compare`]: grading two result documents against the tolerance

pub mod capture;
pub mod compare;
pub mod config;
pub mod fields;
pub mod metrics;
pub mod passes;
pub mod simulation;
pub mod state;

// Re-export the working set of the companion binaries
pub use capture::{
    load_capture, output_file_name, run_capture, save_capture, CaptureError, CaptureInput,
    CaptureOutput, ErosionCommand, FrameRecord, SetupSource,
};
pub use compare::{
    compare_documents, load_metrics_document, ComparisonReport, FrameComparison,
    MetricComparison, MetricsDocument, Severity,
};
pub use config::SimulationParams;
pub use fields::{ScalarField, VectorField};
pub use metrics::FieldMetrics;
pub use simulation::{ErosionSimulation, StepMetrics};
pub use state::SimulationState;
