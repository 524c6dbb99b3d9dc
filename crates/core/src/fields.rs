//! Grid field containers for the erosion pipeline
//!
//! All simulation fields live on a square N×N grid and are stored as flat
//! row-major arrays (`y * size + x`). Scalar quantities (terrain height,
//! water depth, suspended sediment) use [`ScalarField`]; the velocity field
//! uses [`VectorField`] with one `Vector2<f32>` per cell.

use nalgebra::Vector2;

/// Scalar field over a square grid, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    /// Cell values in row-major order (`y * size + x`)
    data: Vec<f32>,
    /// Grid edge length in cells
    size: usize,
}

impl ScalarField {
    /// Create a field of `size`×`size` cells, initialized to zero.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Create a field with every cell set to `value`.
    #[must_use]
    pub fn with_value(size: usize, value: f32) -> Self {
        Self {
            data: vec![value; size * size],
            size,
        }
    }

    /// Grid edge length in cells.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get reference to the raw cell data.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Get mutable reference to the raw cell data.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Get value at grid position.
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.size && y < self.size, "Coordinates out of bounds");
        self.data[y * self.size + x]
    }

    /// Set value at grid position.
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds.
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        assert!(x < self.size && y < self.size, "Coordinates out of bounds");
        self.data[y * self.size + x] = value;
    }

    /// Fill the entire field with a value.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Sample the field at a real-valued grid coordinate with bilinear
    /// interpolation and clamp-to-edge boundaries.
    ///
    /// Coordinates are clamped into `[0, size-1]` per axis before the
    /// floor/ceil neighbors are taken, so out-of-grid lookups return the
    /// nearest edge value rather than zero. This mirrors clamp-to-edge
    /// texture sampling on the GPU side and must not change: the transport
    /// pass is the part of the pipeline most sensitive to boundary policy.
    ///
    /// # Arguments
    ///
    /// * `x` - Column coordinate in cell units (0 = first column)
    /// * `y` - Row coordinate in cell units (0 = first row)
    #[must_use]
    pub fn sample_clamped(&self, x: f32, y: f32) -> f32 {
        let max = (self.size - 1) as f32;
        let xc = x.clamp(0.0, max);
        let yc = y.clamp(0.0, max);

        // Integer cell so that x0+1 stays in bounds; fractional remainder
        let x0 = (xc.floor() as usize).min(self.size.saturating_sub(2));
        let y0 = (yc.floor() as usize).min(self.size.saturating_sub(2));
        let x1 = (x0 + 1).min(self.size - 1);
        let y1 = (y0 + 1).min(self.size - 1);
        let fx = xc - x0 as f32;
        let fy = yc - y0 as f32;

        let v00 = self.data[y0 * self.size + x0];
        let v10 = self.data[y0 * self.size + x1];
        let v01 = self.data[y1 * self.size + x0];
        let v11 = self.data[y1 * self.size + x1];

        let top = v00 * (1.0 - fx) + v10 * fx;
        let bottom = v01 * (1.0 - fx) + v11 * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

/// Two-component vector field over a square grid, stored row-major.
///
/// Used for the per-cell flow velocity `(vx, vy)`, where `vx` displaces
/// along columns and `vy` along rows.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    data: Vec<Vector2<f32>>,
    size: usize,
}

impl VectorField {
    /// Create a field of `size`×`size` cells, initialized to zero vectors.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![Vector2::zeros(); size * size],
            size,
        }
    }

    /// Grid edge length in cells.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get reference to the raw cell data.
    #[must_use]
    pub fn as_slice(&self) -> &[Vector2<f32>] {
        &self.data
    }

    /// Get mutable reference to the raw cell data.
    pub fn as_mut_slice(&mut self) -> &mut [Vector2<f32>] {
        &mut self.data
    }

    /// Get vector at grid position.
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Vector2<f32> {
        assert!(x < self.size && y < self.size, "Coordinates out of bounds");
        self.data[y * self.size + x]
    }

    /// Set vector at grid position.
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds.
    pub fn set(&mut self, x: usize, y: usize, value: Vector2<f32>) {
        assert!(x < self.size && y < self.size, "Coordinates out of bounds");
        self.data[y * self.size + x] = value;
    }

    /// Iterate over all scalar components in memory order: for each cell
    /// (row-major), `vx` then `vy`. Metric reductions over the velocity
    /// field run over this flattened sequence, matching a reduction over
    /// an N×N×2 array.
    pub fn components(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().flat_map(|v| [v.x, v.y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_field_creation() {
        let field = ScalarField::new(8);
        assert_eq!(field.size(), 8);
        assert_eq!(field.as_slice().len(), 64);
        assert!(field.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_scalar_field_get_set() {
        let mut field = ScalarField::new(10);
        field.set(3, 4, 123.45);
        assert_eq!(field.get(3, 4), 123.45);

        // Verify row-major indexing
        let index = 4 * 10 + 3;
        assert_eq!(field.as_slice()[index], 123.45);
    }

    #[test]
    fn test_scalar_field_fill() {
        let mut field = ScalarField::new(5);
        field.fill(99.9);
        assert!(field.as_slice().iter().all(|&v| v == 99.9));
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_scalar_field_bounds_check() {
        let field = ScalarField::new(10);
        let _ = field.get(10, 5);
    }

    #[test]
    fn test_sample_at_integer_coordinates() {
        let mut field = ScalarField::new(4);
        field.set(2, 1, 7.5);
        assert_eq!(field.sample_clamped(2.0, 1.0), 7.5);
    }

    #[test]
    fn test_sample_blends_between_cells() {
        let mut field = ScalarField::new(4);
        field.set(0, 0, 0.0);
        field.set(1, 0, 10.0);
        assert_eq!(field.sample_clamped(0.5, 0.0), 5.0);
        assert_eq!(field.sample_clamped(0.25, 0.0), 2.5);
    }

    #[test]
    fn test_sample_clamps_outside_grid() {
        let mut field = ScalarField::new(3);
        field.set(0, 0, 1.0);
        field.set(2, 2, 9.0);
        // Far outside the grid on both sides: nearest edge cell wins
        assert_eq!(field.sample_clamped(-5.0, -5.0), 1.0);
        assert_eq!(field.sample_clamped(10.0, 10.0), 9.0);
    }

    #[test]
    fn test_sample_uniform_field_is_exact() {
        let field = ScalarField::with_value(6, 3.25);
        for &(x, y) in &[(0.1, 4.9), (2.5, 2.5), (-1.0, 7.0), (5.0, 0.0)] {
            assert_eq!(
                field.sample_clamped(x, y),
                3.25,
                "uniform field must be a fixed point of resampling at ({x}, {y})"
            );
        }
    }

    #[test]
    fn test_vector_field_components_order() {
        let mut field = VectorField::new(2);
        field.set(0, 0, Vector2::new(1.0, 2.0));
        field.set(1, 0, Vector2::new(3.0, 4.0));
        field.set(0, 1, Vector2::new(5.0, 6.0));
        field.set(1, 1, Vector2::new(7.0, 8.0));

        let flat: Vec<f32> = field.components().collect();
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }
}
