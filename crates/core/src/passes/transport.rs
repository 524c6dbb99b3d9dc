//! Transport pass: semi-Lagrangian advection of water and sediment
//!
//! For every cell the pass traces backwards along the velocity field,
//!
//! ```text
//! prev = (x, y) − v · dt / cell_size
//! ```
//!
//! and resamples the source field at `prev` with bilinear clamp-to-edge
//! interpolation. Both fields advect against the same velocity snapshot
//! and each resample reads the untouched pre-pass field into a fresh
//! buffer; in-place sampling would let upstream writes bleed into
//! downstream reads and break parity with the gather-style GPU kernel.

use rayon::prelude::*;

use crate::config::SimulationParams;
use crate::fields::{ScalarField, VectorField};

/// Backtrace-and-resample one scalar field into a fresh buffer.
fn advect(source: &ScalarField, velocity: &VectorField, params: SimulationParams) -> ScalarField {
    let size = source.size();
    let vel = velocity.as_slice();
    let mut out = ScalarField::new(size);

    out.as_mut_slice()
        .par_chunks_mut(size)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let v = vel[y * size + x];
                let prev_x = x as f32 - (v.x * params.dt) / params.cell_size;
                let prev_y = y as f32 - (v.y * params.dt) / params.cell_size;
                *cell = source.sample_clamped(prev_x, prev_y);
            }
        });

    out
}

/// CPU implementation of the transport pass.
///
/// Water and suspended sediment move with the flow; terrain and velocity
/// are untouched. Because the resampler clamps to the grid edge, material
/// leaving the domain piles up against the border instead of vanishing.
pub fn step_transport_cpu(
    water: &mut ScalarField,
    sediment: &mut ScalarField,
    velocity: &VectorField,
    params: SimulationParams,
) {
    *water = advect(water, velocity, params);
    *sediment = advect(sediment, velocity, params);
}
