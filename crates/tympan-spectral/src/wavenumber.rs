//! Wavenumber discretizations, memoized per transform-length bucket.
//!
//! FFTs are only taken at power-of-two lengths. Any requested buffer
//! length `n` maps to the bucket `ceil(log2 n)`; all lengths in the
//! same bucket share one discretization, so a scene with many
//! similarly-sized domains computes each table once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// Wavenumber tables for one transform-length bucket.
#[derive(Clone, Debug)]
pub struct Discretization {
    /// Discretized wavenumbers `k`, length `2^bucket`. Ascends from 0
    /// to `pi / dx` over the first half, then descends back toward 0.
    pub wave_numbers: Vec<f64>,
    /// `+i` over the ascending half, `-i` over the descending half.
    pub complex_factors: Vec<Complex64>,
    /// `exp(-i k dx / 2) * i k`: derivative factor toward a grid
    /// staggered half a cell forward (pressure to velocity nodes).
    pub pressure_deriv_factors: Vec<Complex64>,
    /// `exp(+i k dx / 2) * i k`: derivative factor toward a grid
    /// staggered half a cell backward (velocity to pressure nodes).
    pub velocity_deriv_factors: Vec<Complex64>,
}

impl Discretization {
    fn compute(dx: f64, bucket: u32) -> Self {
        debug_assert!(bucket >= 1);
        let half = 1usize << (bucket - 1);
        let k_max = std::f64::consts::PI / dx;
        let dk = k_max / half as f64;

        let len = 2 * half;
        let mut wave_numbers = Vec::with_capacity(len);
        let mut complex_factors = Vec::with_capacity(len);
        for i in 0..=half {
            wave_numbers.push(i as f64 * dk);
            complex_factors.push(Complex64::new(0.0, 1.0));
        }
        for i in 1..half {
            wave_numbers.push(k_max - i as f64 * dk);
            complex_factors.push(Complex64::new(0.0, -1.0));
        }

        let factor = |shift_sign: f64| -> Vec<Complex64> {
            wave_numbers
                .iter()
                .zip(&complex_factors)
                .map(|(&k, &j)| (shift_sign * j * k * dx / 2.0).exp() * j * k)
                .collect()
        };
        let pressure_deriv_factors = factor(-1.0);
        let velocity_deriv_factors = factor(1.0);

        Self {
            wave_numbers,
            complex_factors,
            pressure_deriv_factors,
            velocity_deriv_factors,
        }
    }
}

/// Shared, append-only cache of [`Discretization`]s and FFT plans.
///
/// Interior mutability behind mutexes so a parallel sub-step fan-out
/// can share one cache by reference. The cache is keyed by bucket
/// only: the grid spacing is fixed for the lifetime of a run.
pub struct WavenumberCache {
    entries: Mutex<HashMap<u32, Arc<Discretization>>>,
    planner: Mutex<FftPlanner<f64>>,
}

impl WavenumberCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            planner: Mutex::new(FftPlanner::new()),
        }
    }

    /// The bucket a buffer of length `n` falls into: `ceil(log2 n)`.
    pub fn bucket(n: usize) -> u32 {
        debug_assert!(n >= 1);
        let b = (n as f64).log2().ceil() as u32;
        b.max(1)
    }

    /// The power-of-two transform length for a buffer of length `n`.
    pub fn fft_length(n: usize) -> usize {
        1usize << Self::bucket(n)
    }

    /// The discretization for buffers of length `n` at spacing `dx`,
    /// computing and memoizing it on first use.
    pub fn discretization(&self, dx: f64, n: usize) -> Arc<Discretization> {
        let bucket = Self::bucket(n);
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            entries
                .entry(bucket)
                .or_insert_with(|| Arc::new(Discretization::compute(dx, bucket))),
        )
    }

    /// A forward FFT plan of the given length.
    pub fn forward_fft(&self, len: usize) -> Arc<dyn Fft<f64>> {
        self.planner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .plan_fft_forward(len)
    }

    /// An inverse FFT plan of the given length. Unnormalized; callers
    /// divide by the length.
    pub fn inverse_fft(&self, len: usize) -> Arc<dyn Fft<f64>> {
        self.planner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .plan_fft_inverse(len)
    }
}

impl Default for WavenumberCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WavenumberCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let buckets: Vec<u32> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        f.debug_struct("WavenumberCache")
            .field("buckets", &buckets)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fft_lengths_round_up_to_powers_of_two() {
        assert_eq!(WavenumberCache::fft_length(42), 64);
        assert_eq!(WavenumberCache::fft_length(64), 64);
        assert_eq!(WavenumberCache::fft_length(65), 128);
        assert_eq!(WavenumberCache::fft_length(1), 2);
    }

    #[test]
    fn lengths_in_one_bucket_share_a_discretization() {
        let cache = WavenumberCache::new();
        let a = cache.discretization(0.2, 178);
        let b = cache.discretization(0.2, 227);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.wave_numbers.len(), 256);
    }

    #[test]
    fn crossing_a_power_of_two_doubles_the_table() {
        let cache = WavenumberCache::new();
        let small = cache.discretization(0.2, 115);
        let large = cache.discretization(0.2, 178);
        assert_eq!(2 * small.wave_numbers.len(), large.wave_numbers.len());
    }

    #[test]
    fn discretized_values_match_references() {
        // Reference values from a 0.2 m spacing, bucket-7 table.
        let cache = WavenumberCache::new();
        let d = cache.discretization(0.2, 115);

        let approx = |a: f64, b: f64| (a - b).abs() < 1e-5 * b.abs().max(1.0);
        assert!(approx(d.wave_numbers[1], 0.245437));
        assert!(approx(d.wave_numbers[99], 7.1176707));

        assert!(approx(d.complex_factors[64].im, 1.0));
        assert!(approx(d.complex_factors[65].im, -1.0));
        assert!(approx(d.complex_factors[64].re, 0.0));
        assert!(approx(d.complex_factors[65].re, 0.0));

        assert!(approx(d.pressure_deriv_factors[39].re, 7.8259545));
        assert!(approx(d.pressure_deriv_factors[39].im, 5.511659));

        assert!(approx(d.velocity_deriv_factors[56].re, -13.480372));
        assert!(approx(d.velocity_deriv_factors[56].im, 2.681413));
    }

    #[test]
    fn wave_numbers_stay_within_the_nyquist_bound() {
        let cache = WavenumberCache::new();
        let d = cache.discretization(0.2, 115);
        let k_max = std::f64::consts::PI / 0.2;
        for &k in &d.wave_numbers {
            assert!(k >= 0.0);
            assert!(k <= k_max + 1e-12);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fft_lengths_are_tight_powers_of_two(n in 1usize..100_000) {
                let len = WavenumberCache::fft_length(n);
                prop_assert!(len.is_power_of_two());
                prop_assert!(len >= n.max(2));
                prop_assert!(len / 2 < n.max(2));
            }

            #[test]
            fn table_length_matches_the_bucket(n in 1usize..10_000) {
                let cache = WavenumberCache::new();
                let d = cache.discretization(0.2, n);
                prop_assert_eq!(d.wave_numbers.len(), WavenumberCache::fft_length(n));
                prop_assert_eq!(d.pressure_deriv_factors.len(), d.wave_numbers.len());
                prop_assert_eq!(d.velocity_deriv_factors.len(), d.wave_numbers.len());
            }
        }
    }
}
