//! Simulation state: the four per-cell fields
//!
//! A [`SimulationState`] owns terrain height, water depth, suspended
//! sediment, and flow velocity for one grid. Construction seeds the
//! deterministic terrain ramp every run starts from; all later mutation
//! happens through the pass functions in [`crate::passes`].

use crate::config::SimulationParams;
use crate::fields::{ScalarField, VectorField};

/// Full per-cell state of one erosion simulation
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Terrain height (world units)
    pub terrain: ScalarField,
    /// Water depth above the terrain (world units)
    pub water: ScalarField,
    /// Suspended sediment carried by the water
    pub sediment: ScalarField,
    /// Flow velocity per cell, `(vx, vy)` in world units per second
    pub velocity: VectorField,
}

impl SimulationState {
    /// Create a state for `params.grid_size` with the initial terrain ramp.
    ///
    /// Terrain rises linearly along x from 0 at the first column to
    /// `height_multiplier` at the last, identical in every row. Water,
    /// sediment, and velocity start at zero. Both simulation sides seed
    /// from this exact surface, so captured metrics stay comparable from
    /// frame zero.
    #[must_use]
    pub fn new(params: &SimulationParams) -> Self {
        let size = params.grid_size;
        let mut terrain = ScalarField::new(size);
        if size > 1 {
            let step = params.height_multiplier / (size - 1) as f32;
            for y in 0..size {
                for x in 0..size {
                    terrain.set(x, y, x as f32 * step);
                }
            }
        }

        Self {
            terrain,
            water: ScalarField::new(size),
            sediment: ScalarField::new(size),
            velocity: VectorField::new(size),
        }
    }

    /// Grid edge length in cells.
    #[must_use]
    pub fn size(&self) -> usize {
        self.terrain.size()
    }
}
