//! Simulation parameters and external parameter mapping
//!
//! Holds every tunable knob of the erosion pipeline in one `Copy` struct so
//! pass functions can take it by value. Capture files carry parameters under
//! camelCase keys; [`SimulationParams::apply_external`] translates those into
//! struct fields and reports unrecognized keys to the caller.

/// Physics parameters for the erosion pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Grid edge length in cells
    pub grid_size: usize,
    /// Timestep in seconds
    pub dt: f32,
    /// Peak height of the initial terrain ramp (world units)
    pub height_multiplier: f32,
    /// Cell size in world units
    pub cell_size: f32,
    /// Per-step velocity damping factor (0-1)
    pub velocity_damping: f32,
    /// Slope floor used when computing sediment capacity
    pub min_slope: f32,
    /// Water density scale applied to the pressure gradient
    pub density: f32,
    /// Water added per cell per step when rain is on
    pub rain_amount: f32,
    /// Fraction of water evaporated per second
    pub evap_rate: f32,
    /// Fraction of the capacity deficit dissolved per step
    pub solubility: f32,
    /// Fraction of the capacity surplus deposited per step
    pub deposition_rate: f32,
    /// Scale from `slope * water` to carrying capacity
    pub capacity_factor: f32,
    /// Whether the water pass adds rain this step
    pub add_rain: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            grid_size: 16,
            dt: 0.05,
            height_multiplier: 0.5,
            cell_size: 1.0,
            velocity_damping: 0.99,
            min_slope: 0.01,
            density: 50_000.0,
            rain_amount: 0.0,
            evap_rate: 0.0,
            solubility: 0.01,
            deposition_rate: 0.5,
            capacity_factor: 4.0,
            add_rain: false,
        }
    }
}

impl SimulationParams {
    /// Apply one externally supplied parameter by its camelCase capture key.
    ///
    /// Returns `false` when the key is not part of the recognized set, so
    /// the caller can warn and continue instead of rejecting the file.
    /// `rain` is deliberately absent from this table: whether rain falls is
    /// a per-command flag in the capture history, not a tuning parameter.
    pub fn apply_external(&mut self, key: &str, value: f64) -> bool {
        match key {
            "gridSize" => self.grid_size = value as usize,
            "dt" => self.dt = value as f32,
            "heightMultiplier" => self.height_multiplier = value as f32,
            "cellSize" => self.cell_size = value as f32,
            "velocityDamping" => self.velocity_damping = value as f32,
            "minSlope" => self.min_slope = value as f32,
            "density" => self.density = value as f32,
            "rainAmount" => self.rain_amount = value as f32,
            "evapRate" => self.evap_rate = value as f32,
            "solubility" => self.solubility = value as f32,
            "depositionRate" => self.deposition_rate = value as f32,
            "capacityFactor" => self.capacity_factor = value as f32,
            _ => return false,
        }
        true
    }
}
