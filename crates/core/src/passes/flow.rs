//! Flow pass: pressure-gradient acceleration of the velocity field
//!
//! Velocity responds to the slope of the combined surface, then decays:
//!
//! ```text
//! H = h + w
//! v ← damping · (v − dt · density · ∇H)
//! ```
//!
//! The gradient is a central difference over `2 · cell_size` with
//! clamp-to-edge neighbors, so border cells see a one-sided slope at half
//! weight. Terrain heights are already world-space, which makes `∇H`
//! directly comparable between both simulation sides without a rescale.

use nalgebra::Vector2;
use rayon::prelude::*;

use crate::config::SimulationParams;

/// CPU implementation of the flow pass.
///
/// Reads terrain and water (post-rain), accumulates into velocity. Rows
/// are processed in parallel; every cell writes only its own velocity and
/// reads the combined surface, so the update order cannot change results.
///
/// # Arguments
///
/// * `terrain` - Terrain height field (world units)
/// * `water` - Water depth field (world units)
/// * `velocity` - Velocity field, updated in place
/// * `size` - Grid edge length in cells
/// * `params` - Physics parameters
pub fn step_flow_cpu(
    terrain: &[f32],
    water: &[f32],
    velocity: &mut [Vector2<f32>],
    size: usize,
    params: SimulationParams,
) {
    // Combined surface the gradient acts on
    let combined: Vec<f32> = terrain
        .iter()
        .zip(water.iter())
        .map(|(h, w)| h + w)
        .collect();

    let denom = 2.0 * params.cell_size;
    let accel = params.dt * params.density;

    velocity
        .par_chunks_mut(size)
        .enumerate()
        .for_each(|(y, row)| {
            let y_up = y.saturating_sub(1);
            let y_down = (y + 1).min(size - 1);
            for (x, vel) in row.iter_mut().enumerate() {
                let x_left = x.saturating_sub(1);
                let x_right = (x + 1).min(size - 1);

                let grad_x =
                    (combined[y * size + x_right] - combined[y * size + x_left]) / denom;
                let grad_y =
                    (combined[y_down * size + x] - combined[y_up * size + x]) / denom;

                *vel -= Vector2::new(grad_x, grad_y) * accel;
                *vel *= params.velocity_damping;
            }
        });
}
