//! Capture file replay
//!
//! A capture file records what the interactive side of the pipeline did:
//! an ordered `history` of erosion commands (iteration count, rain flag,
//! full parameter set) plus optional `generationParams` describing how the
//! terrain was seeded. Replaying a capture re-executes that history on the
//! reference pipeline and records per-pass metrics for every frame, which
//! is what the comparison tool diffs against the captured run.
//!
//! The emitted document mirrors the input: the original `history` is
//! echoed untouched so a result file is self-describing, followed by one
//! `data` entry per frame.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::SimulationParams;
use crate::metrics::FieldMetrics;
use crate::simulation::{ErosionSimulation, StepMetrics};

/// Errors that can occur while loading, replaying, or saving captures
#[derive(Debug)]
pub enum CaptureError {
    /// Failed to read the capture file
    LoadFailed(String),
    /// Failed to decode the capture file as JSON
    ParseFailed(String),
    /// Capture decoded but its contents cannot drive a replay
    InvalidCapture(String),
    /// Failed to serialize replay results
    SerializeFailed(String),
    /// Failed to write the result file
    SaveFailed(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::LoadFailed(msg) => write!(f, "Failed to load capture: {msg}"),
            CaptureError::ParseFailed(msg) => write!(f, "Failed to parse capture: {msg}"),
            CaptureError::InvalidCapture(msg) => write!(f, "Invalid capture: {msg}"),
            CaptureError::SerializeFailed(msg) => write!(f, "Failed to serialize results: {msg}"),
            CaptureError::SaveFailed(msg) => write!(f, "Failed to save results: {msg}"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Where the setup parameters of a replay came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupSource {
    /// The capture carried a non-empty `generationParams` block
    GenerationParams,
    /// Fallback: parameters of the first recorded command
    FirstCommand,
}

/// Parsed capture file
///
/// `history` entries stay as raw JSON values so the result file can echo
/// them byte-for-byte; [`ErosionCommand::from_value`] extracts the typed
/// view when a command is executed.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureInput {
    pub history: Vec<Value>,
    #[serde(rename = "generationParams", default)]
    pub generation_params: Option<Map<String, Value>>,
}

impl CaptureInput {
    /// Resolve the parameter block used to seed the simulation.
    ///
    /// A present but empty `generationParams` object counts as absent;
    /// older captures wrote `{}` when the recorder had nothing to say.
    ///
    /// # Errors
    ///
    /// Fails when no generation parameters exist and the history is empty
    /// or its first command carries no parameter object.
    pub fn setup_params(&self) -> Result<(&Map<String, Value>, SetupSource), CaptureError> {
        if let Some(gen_params) = &self.generation_params {
            if !gen_params.is_empty() {
                return Ok((gen_params, SetupSource::GenerationParams));
            }
        }

        let first = self.history.first().ok_or_else(|| {
            CaptureError::InvalidCapture(
                "no generation parameters and no history to fall back to".to_string(),
            )
        })?;
        let params = first
            .get("params")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                CaptureError::InvalidCapture(
                    "first history command has no 'params' object".to_string(),
                )
            })?;
        Ok((params, SetupSource::FirstCommand))
    }
}

/// One executable entry of the capture history
#[derive(Debug, Clone)]
pub struct ErosionCommand {
    /// Number of steps to run
    pub iterations: u32,
    /// Whether rain falls during those steps
    pub rain: bool,
    /// Full parameter set active for this command
    pub params: Map<String, Value>,
}

impl ErosionCommand {
    /// Extract the typed command from a raw history entry.
    ///
    /// # Errors
    ///
    /// Fails when the entry is not an object or lacks any of the three
    /// required fields.
    pub fn from_value(value: &Value) -> Result<Self, CaptureError> {
        let obj = value.as_object().ok_or_else(|| {
            CaptureError::InvalidCapture("history entry is not an object".to_string())
        })?;
        let iterations = obj
            .get("iterations")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                CaptureError::InvalidCapture(
                    "history entry missing integer 'iterations'".to_string(),
                )
            })? as u32;
        let rain = obj.get("rain").and_then(Value::as_bool).ok_or_else(|| {
            CaptureError::InvalidCapture("history entry missing boolean 'rain'".to_string())
        })?;
        let params = obj
            .get("params")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| {
                CaptureError::InvalidCapture("history entry missing 'params' object".to_string())
            })?;

        Ok(Self {
            iterations,
            rain,
            params,
        })
    }
}

/// Per-pass metrics of one replayed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Global frame index, counted across all commands
    pub frame: u64,
    /// Metrics captured after each pass of this frame
    pub data: StepMetrics,
}

/// Replay result document, ready to serialize
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureOutput {
    /// The input history, echoed untouched
    pub history: Vec<Value>,
    /// One record per simulated frame
    pub data: Vec<FrameRecord>,
}

/// Apply a capture parameter map onto the live parameter set.
///
/// Unknown and non-numeric keys are skipped with a warning. The warning
/// fires once per key per replay; command histories repeat the same
/// parameter block dozens of times and repeating the complaint helps
/// nobody.
fn apply_params(
    params: &mut SimulationParams,
    map: &Map<String, Value>,
    warned: &mut FxHashSet<String>,
) {
    for (key, value) in map {
        match value.as_f64() {
            Some(num) => {
                if !params.apply_external(key, num) && warned.insert(key.clone()) {
                    warn!("Capture parameter '{}' not recognized, skipping", key);
                }
            }
            None => {
                if warned.insert(key.clone()) {
                    warn!("Capture parameter '{}' is not numeric, skipping", key);
                }
            }
        }
    }
}

/// Replay a capture and record per-pass metrics for every frame.
///
/// Frames are numbered globally across commands, matching the frame
/// counter of the interactive recording.
///
/// # Errors
///
/// Fails when the capture lacks usable setup parameters, a numeric
/// `gridSize`, or a well-formed history entry.
pub fn run_capture(input: &CaptureInput) -> Result<CaptureOutput, CaptureError> {
    let (setup, source) = input.setup_params()?;
    match source {
        SetupSource::GenerationParams => info!("Found generation parameters in capture file"),
        SetupSource::FirstCommand => {
            warn!("No generation parameters in capture file, seeding from the first command");
        }
    }

    let grid_size = setup
        .get("gridSize")
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            CaptureError::InvalidCapture("setup parameters missing numeric 'gridSize'".to_string())
        })?;
    if grid_size < 1.0 {
        return Err(CaptureError::InvalidCapture(format!(
            "gridSize must be a positive integer, got {grid_size}"
        )));
    }

    let mut warned = FxHashSet::default();
    let mut params = SimulationParams {
        grid_size: grid_size as usize,
        ..SimulationParams::default()
    };
    apply_params(&mut params, setup, &mut warned);

    let mut sim = ErosionSimulation::new(params);
    let terrain_sum = FieldMetrics::from_slice(sim.state().terrain.as_slice()).sum;
    info!(
        "Initial state: {}x{} grid, terrain height sum {:.4}",
        sim.params().grid_size,
        sim.params().grid_size,
        terrain_sum
    );

    let allocated = sim.state().size();
    let mut frames = Vec::new();
    let mut frame: u64 = 0;
    for entry in &input.history {
        let command = ErosionCommand::from_value(entry)?;
        apply_params(sim.params_mut(), &command.params, &mut warned);
        sim.params_mut().add_rain = command.rain;
        // The grid shape is fixed at allocation; a command cannot resize it
        if sim.params().grid_size != allocated {
            warn!(
                "Command changes gridSize to {} but the grid was allocated at {}, ignoring",
                sim.params().grid_size,
                allocated
            );
            sim.params_mut().grid_size = allocated;
        }
        info!(
            "Executing command: {} iterations, rain={}",
            command.iterations, command.rain
        );

        for _ in 0..command.iterations {
            let data = sim.step_captured();
            frames.push(FrameRecord { frame, data });
            frame += 1;
        }
    }

    Ok(CaptureOutput {
        history: input.history.clone(),
        data: frames,
    })
}

/// Load a capture file from disk.
///
/// # Errors
///
/// Returns [`CaptureError::LoadFailed`] when the file cannot be read and
/// [`CaptureError::ParseFailed`] when it is not valid capture JSON.
pub fn load_capture<P: AsRef<Path>>(path: P) -> Result<CaptureInput, CaptureError> {
    let contents =
        fs::read_to_string(path).map_err(|e| CaptureError::LoadFailed(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| CaptureError::ParseFailed(e.to_string()))
}

/// Save a replay result document as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or the final write fails.
pub fn save_capture<P: AsRef<Path>>(output: &CaptureOutput, path: P) -> Result<(), CaptureError> {
    let contents = serde_json::to_string_pretty(output)
        .map_err(|e| CaptureError::SerializeFailed(e.to_string()))?;
    fs::write(path, contents).map_err(|e| CaptureError::SaveFailed(e.to_string()))?;
    Ok(())
}

/// Result file name for a given capture file.
///
/// Timestamped recordings like `sim_capture_20240131.json` all collapse to
/// `sim_capture_cpu.json`; anything else keeps its stem with a `_cpu`
/// suffix.
#[must_use]
pub fn output_file_name(input_path: &Path) -> String {
    let stem = input_path
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("capture");
    if stem.starts_with("sim_capture_") {
        "sim_capture_cpu.json".to_string()
    } else {
        format!("{stem}_cpu.json")
    }
}
