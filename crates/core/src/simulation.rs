//! Simulation orchestration: pass sequencing and per-pass metric capture
//!
//! [`ErosionSimulation`] owns the parameter block and field state and runs
//! the six passes in their fixed order. Two step entry points exist:
//! [`ErosionSimulation::step`] for plain advancement, and
//! [`ErosionSimulation::step_captured`] which snapshots field metrics
//! between passes the same way the GPU side reads back after each
//! dispatch. Capture points sit mid-step because an end-of-step snapshot
//! alone cannot tell which pass diverged.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SimulationParams;
use crate::metrics::FieldMetrics;
use crate::passes::{
    step_deposition_cpu, step_erosion_cpu, step_evaporation_cpu, step_flow_cpu,
    step_transport_cpu, step_water_cpu,
};
use crate::state::SimulationState;

/// Metrics snapshotted after each pass of one step
///
/// Field order matches the capture schema: one entry per observation
/// point, keyed by the pass that just ran and the field observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepMetrics {
    pub pass1_water: FieldMetrics,
    pub pass2_velocity: FieldMetrics,
    pub pass3_terrain: FieldMetrics,
    pub pass3_sediment: FieldMetrics,
    pub pass4_water: FieldMetrics,
    pub pass4_sediment: FieldMetrics,
    pub pass5_terrain: FieldMetrics,
    pub pass5_sediment: FieldMetrics,
    pub pass6_water: FieldMetrics,
}

/// One erosion simulation: parameters plus field state
#[derive(Debug, Clone)]
pub struct ErosionSimulation {
    params: SimulationParams,
    state: SimulationState,
    step_count: u64,
}

impl ErosionSimulation {
    /// Create a simulation seeded with the deterministic terrain ramp.
    #[must_use]
    pub fn new(params: SimulationParams) -> Self {
        let state = SimulationState::new(&params);
        debug!("Created erosion simulation: {}x{} grid", params.grid_size, params.grid_size);
        Self {
            params,
            state,
            step_count: 0,
        }
    }

    /// Current parameters.
    #[must_use]
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Mutable parameters, for per-command retuning between steps.
    ///
    /// Field extents are fixed at creation; a `grid_size` change after
    /// construction has no effect on the passes.
    pub fn params_mut(&mut self) -> &mut SimulationParams {
        &mut self.params
    }

    /// Current field state.
    #[must_use]
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Number of steps run since creation.
    #[must_use]
    pub fn steps_run(&self) -> u64 {
        self.step_count
    }

    /// Advance one step without capturing metrics.
    ///
    /// Pass order must stay identical to [`Self::step_captured`].
    pub fn step(&mut self) {
        let params = self.params;
        let size = self.state.size();

        step_water_cpu(self.state.water.as_mut_slice(), params);
        step_flow_cpu(
            self.state.terrain.as_slice(),
            self.state.water.as_slice(),
            self.state.velocity.as_mut_slice(),
            size,
            params,
        );
        step_erosion_cpu(
            self.state.terrain.as_mut_slice(),
            self.state.water.as_slice(),
            self.state.sediment.as_mut_slice(),
            self.state.velocity.as_slice(),
            params,
        );
        step_transport_cpu(
            &mut self.state.water,
            &mut self.state.sediment,
            &self.state.velocity,
            params,
        );
        step_deposition_cpu(
            self.state.terrain.as_mut_slice(),
            self.state.water.as_slice(),
            self.state.sediment.as_mut_slice(),
            self.state.velocity.as_slice(),
            params,
        );
        step_evaporation_cpu(self.state.water.as_mut_slice(), params);

        self.step_count += 1;
    }

    /// Advance one step, snapshotting metrics after each pass.
    pub fn step_captured(&mut self) -> StepMetrics {
        let params = self.params;
        let size = self.state.size();

        step_water_cpu(self.state.water.as_mut_slice(), params);
        let pass1_water = FieldMetrics::from_slice(self.state.water.as_slice());

        step_flow_cpu(
            self.state.terrain.as_slice(),
            self.state.water.as_slice(),
            self.state.velocity.as_mut_slice(),
            size,
            params,
        );
        let pass2_velocity = FieldMetrics::from_values(self.state.velocity.components());

        step_erosion_cpu(
            self.state.terrain.as_mut_slice(),
            self.state.water.as_slice(),
            self.state.sediment.as_mut_slice(),
            self.state.velocity.as_slice(),
            params,
        );
        let pass3_terrain = FieldMetrics::from_slice(self.state.terrain.as_slice());
        let pass3_sediment = FieldMetrics::from_slice(self.state.sediment.as_slice());

        step_transport_cpu(
            &mut self.state.water,
            &mut self.state.sediment,
            &self.state.velocity,
            params,
        );
        let pass4_water = FieldMetrics::from_slice(self.state.water.as_slice());
        let pass4_sediment = FieldMetrics::from_slice(self.state.sediment.as_slice());

        step_deposition_cpu(
            self.state.terrain.as_mut_slice(),
            self.state.water.as_slice(),
            self.state.sediment.as_mut_slice(),
            self.state.velocity.as_slice(),
            params,
        );
        let pass5_terrain = FieldMetrics::from_slice(self.state.terrain.as_slice());
        let pass5_sediment = FieldMetrics::from_slice(self.state.sediment.as_slice());

        step_evaporation_cpu(self.state.water.as_mut_slice(), params);
        let pass6_water = FieldMetrics::from_slice(self.state.water.as_slice());

        self.step_count += 1;

        StepMetrics {
            pass1_water,
            pass2_velocity,
            pass3_terrain,
            pass3_sediment,
            pass4_water,
            pass4_sediment,
            pass5_terrain,
            pass5_sediment,
            pass6_water,
        }
    }
}
