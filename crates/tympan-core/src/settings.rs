//! Simulation parameters and the quantities derived from them.
//!
//! [`SimulationParameters`] holds the raw user-facing knobs; a
//! validated [`Settings`] derives everything the kernel consumes: grid
//! spacing, the spatial window, the Runge-Kutta time step, and the
//! attenuation profiles of the absorbing layers. All derivation happens
//! once, in [`Settings::new`], so the hot loop only reads.

use std::f64::consts::LN_10;

use crate::error::ConfigError;

/// Threshold below which an edge absorption coefficient is treated as
/// fully reflective when sizing absorbing layers.
pub const EPSILON: f64 = 1e-9;

/// Effective density of a missing neighbour.
///
/// Large enough that the impedance contrast against air behaves as a
/// perfectly rigid wall in the reflection coefficients.
pub const VACUUM_DENSITY: f64 = 1e200;

/// Stage coefficients of the six-stage optimized Runge-Kutta scheme.
///
/// The per-stage step fractions are derived from these as successive
/// ratios; see [`Settings::rk_stage_factors`].
pub const RK_STAGE_COEFFICIENTS: [f64; 6] = [
    8.914_212_61e-4,
    7.555_704_391e-3,
    4.091_973_204_1e-2,
    1.659_197_713_68e-1,
    0.5,
    1.0,
];

/// Candidate grid spacings, in metres.
///
/// The derivation picks the largest entry strictly below half the
/// shortest wavelength of interest.
const GRID_SPACING_TABLE: [f64; 9] = [0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0];

/// Raw, user-facing simulation parameters.
#[derive(Clone, Debug)]
pub struct SimulationParameters {
    /// Speed of sound in the medium, m/s.
    pub sound_speed: f64,
    /// Density of the medium, kg/m^3.
    pub air_density: f64,
    /// Grid spacing in metres. When `None` it is derived from
    /// `max_frequency`.
    pub grid_spacing: Option<f64>,
    /// Highest frequency of interest, Hz. Only consulted when
    /// `grid_spacing` is `None`.
    pub max_frequency: f64,
    /// Window accuracy target in dB; controls the window size and
    /// steepness used by the spectral derivative.
    pub patch_error: f64,
    /// Simulated time span, seconds.
    pub render_time: f64,
    /// Depth of synthesized absorbing layers, in cells.
    pub pml_cells: usize,
    /// Peak attenuation coefficient of the absorbing layers.
    pub pml_attenuation: f64,
    /// CFL-like factor relating the time step to `dx / c`.
    pub rk_time_factor: f64,
    /// Runge-Kutta stage coefficients.
    pub rk_coefficients: [f64; 6],
    /// Emit every n-th frame to the callback.
    pub save_nth_frame: usize,
    /// Sample receivers by spectral interpolation rather than
    /// nearest-neighbour lookup.
    pub spectral_interpolation: bool,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            sound_speed: 340.0,
            air_density: 1.2,
            grid_spacing: Some(0.2),
            max_frequency: 850.0,
            patch_error: 70.0,
            render_time: 1.0,
            pml_cells: 50,
            pml_attenuation: 20_000.0,
            rk_time_factor: 0.5,
            rk_coefficients: RK_STAGE_COEFFICIENTS,
            save_nth_frame: 1,
            spectral_interpolation: true,
        }
    }
}

/// Validated parameters plus every derived quantity the kernel needs.
#[derive(Clone, Debug)]
pub struct Settings {
    params: SimulationParameters,
    grid_spacing: f64,
    window_size: usize,
    window: Vec<f64>,
    band_width: f64,
    dt: f64,
    frame_count: usize,
    rk_stage_factors: [f64; 6],
    pml_pressure_decay: Vec<f64>,
    pml_velocity_decay: Vec<f64>,
}

impl Settings {
    /// Validate raw parameters and derive the dependent quantities.
    pub fn new(params: SimulationParameters) -> Result<Self, ConfigError> {
        Self::require_positive("sound_speed", params.sound_speed)?;
        Self::require_positive("air_density", params.air_density)?;
        Self::require_positive("render_time", params.render_time)?;
        Self::require_positive("rk_time_factor", params.rk_time_factor)?;
        Self::require_positive("pml_attenuation", params.pml_attenuation)?;
        if params.pml_cells == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "pml_cells",
                reason: "must be at least 1".into(),
            });
        }
        for &coefficient in &params.rk_coefficients {
            Self::require_positive("rk_coefficients", coefficient)?;
        }
        if params.save_nth_frame == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "save_nth_frame",
                reason: "must be at least 1".into(),
            });
        }

        let grid_spacing = match params.grid_spacing {
            Some(dx) => {
                Self::require_positive("grid_spacing", dx)?;
                dx
            }
            None => Self::fit_grid_spacing(params.sound_speed, params.max_frequency)?,
        };

        let half_window = ((0.70 * params.patch_error - 17.0) / 2.0).round();
        if half_window < 1.0 {
            return Err(ConfigError::InvalidParameter {
                name: "patch_error",
                reason: "too small to yield a usable window".into(),
            });
        }
        let window_size = (half_window * 2.0) as usize;
        let window_alpha = (params.patch_error - 40.0) / 20.0 + 1.0;
        let w = window_size as f64;
        let window = (0..=2 * window_size)
            .map(|j| {
                let t = (j as f64 - w) / w;
                (-window_alpha * LN_10 * t.powi(6)).exp()
            })
            .collect();

        let sample_frequency = params.sound_speed / grid_spacing;
        let band_width = 3e-6 * sample_frequency * sample_frequency;

        let dt = params.rk_time_factor * grid_spacing / params.sound_speed;
        let frame_count = (params.render_time / dt).floor() as usize;

        // Each stage factor is the ratio of this stage's coefficient to
        // the next one's, turning the cumulative coefficients into
        // per-stage step fractions; the final stage completes the frame
        // with its coefficient as-is.
        let coef = &params.rk_coefficients;
        let mut rk_stage_factors = [coef[5]; 6];
        for i in 0..5 {
            rk_stage_factors[i] = coef[i] / coef[i + 1];
        }

        let n = params.pml_cells as f64;
        let pml_pressure_decay = (0..params.pml_cells)
            .map(|i| {
                let alpha = params.pml_attenuation * ((i as f64 + 0.5) / n).powi(4);
                (-alpha * dt).exp()
            })
            .collect();
        // Velocity nodes are collocated with the layer boundary, so the
        // profile has one extra sample and starts at zero attenuation.
        let pml_velocity_decay = (0..=params.pml_cells)
            .map(|i| {
                let alpha = params.pml_attenuation * (i as f64 / n).powi(4);
                (-alpha * dt).exp()
            })
            .collect();

        Ok(Self {
            params,
            grid_spacing,
            window_size,
            window,
            band_width,
            dt,
            frame_count,
            rk_stage_factors,
            pml_pressure_decay,
            pml_velocity_decay,
        })
    }

    /// Largest tabulated spacing resolving `max_frequency`.
    fn fit_grid_spacing(sound_speed: f64, max_frequency: f64) -> Result<f64, ConfigError> {
        if max_frequency <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_frequency",
                reason: "must be positive".into(),
            });
        }
        let limit = sound_speed / max_frequency / 2.0;
        GRID_SPACING_TABLE
            .iter()
            .rev()
            .find(|&&dx| dx < limit)
            .copied()
            .ok_or(ConfigError::GridSpacingUnresolvable { max_frequency })
    }

    fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value > 0.0 && value.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::InvalidParameter {
                name,
                reason: "must be positive and finite".into(),
            })
        }
    }

    /// The raw parameters this configuration was derived from.
    pub fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    /// Grid spacing `dx`, metres.
    pub fn grid_spacing(&self) -> f64 {
        self.grid_spacing
    }

    /// Half-width `W` of the spatial window, in cells.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// The full window, `2W + 1` samples peaking at 1 in the middle.
    pub fn window(&self) -> &[f64] {
        &self.window
    }

    /// Normalized bandwidth of the Gaussian source pulse.
    pub fn band_width(&self) -> f64 {
        self.band_width
    }

    /// Runge-Kutta time step, seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of whole frames inside the render interval.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Stage coefficients for the six RK sub-steps.
    pub fn rk_coefficients(&self) -> &[f64; 6] {
        &self.params.rk_coefficients
    }

    /// Per-stage step fractions derived from the stage coefficients.
    ///
    /// Stage `s` integrates over `rk_stage_factors()[s] * dt`. The
    /// fractions are the stage coefficients divided by their successor,
    /// with the last stage keeping its coefficient outright.
    pub fn rk_stage_factors(&self) -> &[f64; 6] {
        &self.rk_stage_factors
    }

    /// Speed of sound, m/s.
    pub fn sound_speed(&self) -> f64 {
        self.params.sound_speed
    }

    /// Medium density, kg/m^3.
    pub fn air_density(&self) -> f64 {
        self.params.air_density
    }

    /// Depth of synthesized absorbing layers, cells.
    pub fn pml_cells(&self) -> usize {
        self.params.pml_cells
    }

    /// Per-step pressure decay factors inside an absorbing layer,
    /// ordered from the boundary inward; `pml_cells` samples.
    pub fn pml_pressure_decay(&self) -> &[f64] {
        &self.pml_pressure_decay
    }

    /// Per-step velocity decay factors inside an absorbing layer;
    /// `pml_cells + 1` samples, the first being no attenuation.
    pub fn pml_velocity_decay(&self) -> &[f64] {
        &self.pml_velocity_decay
    }

    /// Emission cadence: every n-th frame is reported.
    pub fn save_nth_frame(&self) -> usize {
        self.params.save_nth_frame
    }

    /// Whether receivers use spectral interpolation.
    pub fn spectral_interpolation(&self) -> bool {
        self.params.spectral_interpolation
    }
}
