//! Water budget passes: rain and evaporation
//!
//! The first and last passes of a step. Both are uniform per-cell updates
//! with no neighbor reads, so they run as plain sequential loops.

use crate::config::SimulationParams;

/// CPU implementation of the water pass.
///
/// When rain is enabled, every cell gains `rain_amount` of water depth.
/// With rain disabled this pass leaves the field untouched, which keeps
/// dry-run captures bit-stable across steps.
pub fn step_water_cpu(water: &mut [f32], params: SimulationParams) {
    if !params.add_rain {
        return;
    }
    for w in water.iter_mut() {
        *w += params.rain_amount;
    }
}

/// CPU implementation of the evaporation pass.
///
/// Scales water depth by `1 - evap_rate * dt`, floored at zero so a large
/// timestep can dry the grid out but never drive depths negative.
pub fn step_evaporation_cpu(water: &mut [f32], params: SimulationParams) {
    let retain = (1.0 - params.evap_rate * params.dt).max(0.0);
    for w in water.iter_mut() {
        *w *= retain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rain_adds_uniform_depth() {
        let mut water = vec![0.0_f32; 16];
        let params = SimulationParams {
            add_rain: true,
            rain_amount: 0.1,
            ..SimulationParams::default()
        };
        step_water_cpu(&mut water, params);
        assert!(water.iter().all(|&w| (w - 0.1).abs() < 1e-7));
    }

    #[test]
    fn test_no_rain_is_identity() {
        let mut water = vec![0.3_f32, 0.0, 1.5];
        let expected = water.clone();
        let params = SimulationParams {
            add_rain: false,
            rain_amount: 0.1,
            ..SimulationParams::default()
        };
        step_water_cpu(&mut water, params);
        assert_eq!(water, expected);
    }

    #[test]
    fn test_evaporation_scales_depth() {
        let mut water = vec![1.0_f32, 0.5];
        let params = SimulationParams {
            evap_rate: 0.5,
            dt: 0.1,
            ..SimulationParams::default()
        };
        step_evaporation_cpu(&mut water, params);
        assert_relative_eq!(water[0], 0.95, epsilon = 1e-6);
        assert_relative_eq!(water[1], 0.475, epsilon = 1e-6);
    }

    #[test]
    fn test_extreme_evaporation_clamps_at_dry() {
        let mut water = vec![1.0_f32, 2.0];
        let params = SimulationParams {
            evap_rate: 100.0,
            dt: 1.0,
            ..SimulationParams::default()
        };
        step_evaporation_cpu(&mut water, params);
        assert_eq!(water, vec![0.0, 0.0], "retention factor must clamp at zero");
    }

    #[test]
    fn test_evaporation_never_increases_water() {
        let mut water = vec![0.8_f32; 8];
        let params = SimulationParams {
            evap_rate: 0.01,
            dt: 0.05,
            ..SimulationParams::default()
        };
        for _ in 0..50 {
            let before = water.clone();
            step_evaporation_cpu(&mut water, params);
            for (a, b) in water.iter().zip(&before) {
                assert!(a <= b);
            }
        }
    }
}
