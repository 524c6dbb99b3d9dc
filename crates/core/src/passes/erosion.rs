//! Erosion and deposition passes: sediment exchange with the terrain
//!
//! Both passes compare suspended sediment against the local carrying
//! capacity of the water column:
//!
//! ```text
//! capacity = max(min_slope, |v|) · w · capacity_factor
//! ```
//!
//! Under capacity, the erosion pass dissolves terrain into suspension at
//! `solubility` per step; over capacity, the deposition pass settles the
//! surplus back out at `deposition_rate` per step. Every unit moved is
//! exchanged between `h` and `s`, so the pair conserves `h + s` exactly.

use nalgebra::Vector2;

use crate::config::SimulationParams;

/// Sediment carrying capacity of one cell.
///
/// The `min_slope` floor keeps standing water slightly abrasive, so pooled
/// cells still exchange sediment instead of freezing the field.
#[must_use]
pub fn sediment_capacity(velocity: Vector2<f32>, water: f32, params: SimulationParams) -> f32 {
    params.min_slope.max(velocity.norm()) * water * params.capacity_factor
}

/// CPU implementation of the erosion pass.
///
/// Cells whose capacity exceeds their suspended load dissolve terrain:
/// `min((capacity - s) · solubility, h)` moves from `h` to `s`. The clamp
/// against `h` means bedrock at zero height can never erode negative.
pub fn step_erosion_cpu(
    terrain: &mut [f32],
    water: &[f32],
    sediment: &mut [f32],
    velocity: &[Vector2<f32>],
    params: SimulationParams,
) {
    for idx in 0..terrain.len() {
        let capacity = sediment_capacity(velocity[idx], water[idx], params);
        if capacity > sediment[idx] {
            let amount = ((capacity - sediment[idx]) * params.solubility).min(terrain[idx]);
            terrain[idx] -= amount;
            sediment[idx] += amount;
        }
    }
}

/// CPU implementation of the deposition pass.
///
/// The mirror of erosion: cells holding more sediment than their capacity
/// settle `min((s - capacity) · deposition_rate, s)` back onto the
/// terrain. The clamp against `s` keeps suspended load non-negative even
/// with a deposition rate above one.
pub fn step_deposition_cpu(
    terrain: &mut [f32],
    water: &[f32],
    sediment: &mut [f32],
    velocity: &[Vector2<f32>],
    params: SimulationParams,
) {
    for idx in 0..terrain.len() {
        let capacity = sediment_capacity(velocity[idx], water[idx], params);
        if sediment[idx] > capacity {
            let amount = ((sediment[idx] - capacity) * params.deposition_rate).min(sediment[idx]);
            terrain[idx] += amount;
            sediment[idx] -= amount;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn exchange_params() -> SimulationParams {
        SimulationParams {
            min_slope: 0.01,
            capacity_factor: 4.0,
            solubility: 0.01,
            deposition_rate: 0.5,
            ..SimulationParams::default()
        }
    }

    #[test]
    fn test_still_water_capacity_uses_slope_floor() {
        let params = exchange_params();
        let capacity = sediment_capacity(Vector2::zeros(), 2.0, params);
        assert_relative_eq!(capacity, 0.01 * 2.0 * 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fast_water_capacity_uses_speed() {
        let params = exchange_params();
        let capacity = sediment_capacity(Vector2::new(3.0, 4.0), 0.5, params);
        // Speed 5 dominates the slope floor
        assert_relative_eq!(capacity, 5.0 * 0.5 * 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_erosion_moves_terrain_into_suspension() {
        let params = exchange_params();
        let mut terrain = vec![1.0_f32];
        let mut sediment = vec![0.0_f32];
        let water = vec![1.0_f32];
        let velocity = vec![Vector2::new(1.0, 0.0)];

        step_erosion_cpu(&mut terrain, &water, &mut sediment, &velocity, params);

        // capacity = 1 * 1 * 4 = 4, amount = 4 * 0.01
        assert_relative_eq!(terrain[0], 1.0 - 0.04, epsilon = 1e-6);
        assert_relative_eq!(sediment[0], 0.04, epsilon = 1e-6);
        assert_relative_eq!(terrain[0] + sediment[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_erosion_cannot_dig_below_zero() {
        let params = exchange_params();
        let mut terrain = vec![0.0_f32];
        let mut sediment = vec![0.0_f32];
        let water = vec![5.0_f32];
        let velocity = vec![Vector2::new(10.0, 0.0)];

        step_erosion_cpu(&mut terrain, &water, &mut sediment, &velocity, params);

        assert_eq!(terrain[0], 0.0);
        assert_eq!(sediment[0], 0.0);
    }

    #[test]
    fn test_saturated_cell_does_not_erode() {
        let params = exchange_params();
        let mut terrain = vec![1.0_f32];
        let mut sediment = vec![10.0_f32];
        let water = vec![0.1_f32];
        let velocity = vec![Vector2::zeros()];

        step_erosion_cpu(&mut terrain, &water, &mut sediment, &velocity, params);

        assert_eq!(terrain[0], 1.0);
        assert_eq!(sediment[0], 10.0);
    }

    #[test]
    fn test_deposition_settles_surplus() {
        let params = exchange_params();
        let mut terrain = vec![0.5_f32];
        let mut sediment = vec![1.0_f32];
        // Dry cell: capacity is zero, everything above it is surplus
        let water = vec![0.0_f32];
        let velocity = vec![Vector2::zeros()];

        step_deposition_cpu(&mut terrain, &water, &mut sediment, &velocity, params);

        assert_relative_eq!(terrain[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(sediment[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_deposition_clamps_at_available_sediment() {
        let params = SimulationParams {
            deposition_rate: 2.0,
            ..exchange_params()
        };
        let mut terrain = vec![0.0_f32];
        let mut sediment = vec![0.3_f32];
        let water = vec![0.0_f32];
        let velocity = vec![Vector2::zeros()];

        step_deposition_cpu(&mut terrain, &water, &mut sediment, &velocity, params);

        assert_relative_eq!(terrain[0], 0.3, epsilon = 1e-6);
        assert_eq!(sediment[0], 0.0, "suspended load must not go negative");
    }

    #[test]
    fn test_exchange_conserves_total_material() {
        let params = exchange_params();
        let mut terrain = vec![0.8_f32, 0.2, 0.0, 1.5];
        let mut sediment = vec![0.0_f32, 0.5, 0.1, 0.02];
        let water = vec![1.0_f32, 0.3, 0.0, 2.0];
        let velocity = vec![
            Vector2::new(0.5, 0.5),
            Vector2::zeros(),
            Vector2::new(-1.0, 0.0),
            Vector2::new(0.0, 2.0),
        ];
        let total_before: f32 = terrain.iter().chain(sediment.iter()).sum();

        step_erosion_cpu(&mut terrain, &water, &mut sediment, &velocity, params);
        step_deposition_cpu(&mut terrain, &water, &mut sediment, &velocity, params);

        let total_after: f32 = terrain.iter().chain(sediment.iter()).sum();
        assert_relative_eq!(total_before, total_after, epsilon = 1e-5);
    }
}
