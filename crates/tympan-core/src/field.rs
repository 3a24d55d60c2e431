//! Dense 2-D scalar fields with explicit shapes.
//!
//! Every acoustic variable is held in a [`Field2`]: a row-major `f64`
//! buffer whose width and height are part of the value. Staggering is
//! expressed through the shape itself — a horizontal velocity buffer
//! on a `w x h` pressure grid has shape `(w+1) x h` — so shape
//! mismatches are hard programming errors, caught by assertions rather
//! than silently broadcast.

use std::fmt;

use crate::geometry::Size;

/// Which kind of grid node a field lives on.
///
/// Pressure nodes sit at cell centres, staggered half a cell away from
/// domain boundaries; velocity nodes are collocated with boundaries.
/// The distinction drives both buffer shapes and the wing indexing of
/// the spectral derivative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Cell-centred pressure node.
    Pressure,
    /// Boundary-collocated velocity node.
    Velocity,
}

/// A row-major 2-D buffer of `f64` samples.
#[derive(Clone, PartialEq)]
pub struct Field2 {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Field2 {
    /// A zero-filled field of the given shape.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Wrap an existing buffer.
    ///
    /// # Panics
    /// If `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), width * height, "field buffer length mismatch");
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in samples.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Shape as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Sample at column `x`, row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x]
    }

    /// Overwrite the sample at column `x`, row `y`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x] = value;
    }

    /// Add `value` to the sample at column `x`, row `y`.
    #[inline]
    pub fn add(&mut self, x: usize, y: usize, value: f64) {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x] += value;
    }

    /// Row `y` as a slice.
    pub fn row(&self, y: usize) -> &[f64] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Row `y` as a mutable slice.
    pub fn row_mut(&mut self, y: usize) -> &mut [f64] {
        &mut self.data[y * self.width..(y + 1) * self.width]
    }

    /// The whole buffer, row-major.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// The whole buffer, row-major, mutable.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Set every sample to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// A new field with rows and columns exchanged.
    pub fn transposed(&self) -> Field2 {
        let mut out = Field2::zeros(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(y, x, self.get(x, y));
            }
        }
        out
    }

    /// `self - factor * other`, elementwise.
    ///
    /// # Panics
    /// If the shapes differ.
    pub fn sub_scaled(&self, other: &Field2, factor: f64) -> Field2 {
        self.assert_same_shape(other);
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a - factor * b)
            .collect();
        Field2 {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// `self + other`, elementwise.
    ///
    /// # Panics
    /// If the shapes differ.
    pub fn added(&self, other: &Field2) -> Field2 {
        self.assert_same_shape(other);
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a + b)
            .collect();
        Field2 {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Multiply column `x` of every row by `factors[x]`.
    ///
    /// # Panics
    /// If `factors.len() != width`.
    pub fn scale_columns(&mut self, factors: &[f64]) {
        assert_eq!(factors.len(), self.width, "column factor length mismatch");
        for row in self.data.chunks_exact_mut(self.width) {
            for (v, f) in row.iter_mut().zip(factors) {
                *v *= f;
            }
        }
    }

    /// Multiply every sample of row `y` by `factors[y]`.
    ///
    /// # Panics
    /// If `factors.len() != height`.
    pub fn scale_rows(&mut self, factors: &[f64]) {
        assert_eq!(factors.len(), self.height, "row factor length mismatch");
        for (row, f) in self.data.chunks_exact_mut(self.width).zip(factors) {
            for v in row.iter_mut() {
                *v *= f;
            }
        }
    }

    /// The buffer truncated to `f32`, row-major, for frame emission.
    pub fn to_f32(&self) -> Vec<f32> {
        self.data.iter().map(|&v| v as f32).collect()
    }

    fn assert_same_shape(&self, other: &Field2) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "field shape mismatch"
        );
    }
}

impl fmt::Debug for Field2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field2")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_is_row_major() {
        let f = Field2::from_vec(3, 2, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(f.get(0, 0), 0.0);
        assert_eq!(f.get(2, 0), 2.0);
        assert_eq!(f.get(0, 1), 10.0);
        assert_eq!(f.row(1), &[10.0, 11.0, 12.0]);
    }

    #[test]
    fn transpose_round_trips() {
        let f = Field2::from_vec(3, 2, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        let t = f.transposed();
        assert_eq!(t.size(), Size::new(2, 3));
        assert_eq!(t.get(1, 2), 12.0);
        assert_eq!(t.transposed(), f);
    }

    #[test]
    fn sub_scaled_matches_update_equation() {
        let a = Field2::from_vec(2, 1, vec![1.0, 2.0]);
        let b = Field2::from_vec(2, 1, vec![4.0, 8.0]);
        let out = a.sub_scaled(&b, 0.25);
        assert_eq!(out.data(), &[0.0, 0.0]);
    }

    #[test]
    fn column_and_row_scaling_are_separable() {
        // A corner attenuation profile is the outer product of a
        // horizontal and a vertical profile; applying both must equal
        // the elementwise product with that outer product.
        let mut f = Field2::from_vec(2, 2, vec![1.0, 1.0, 1.0, 1.0]);
        f.scale_columns(&[2.0, 3.0]);
        f.scale_rows(&[5.0, 7.0]);
        assert_eq!(f.data(), &[10.0, 15.0, 14.0, 21.0]);
    }

    #[test]
    #[should_panic(expected = "field shape mismatch")]
    fn mismatched_shapes_panic() {
        let a = Field2::zeros(2, 2);
        let b = Field2::zeros(3, 2);
        let _ = a.added(&b);
    }
}
