//! Tympan: a pseudospectral time-domain (PSTD) acoustic simulation engine.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all tympan sub-crates. For most users, adding `tympan` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tympan::prelude::*;
//!
//! // An 8 m × 8 m room with fully absorbing walls, a source in the
//! // middle and a receiver one metre to its right.
//! let mut description = SceneDescription::new(SimulationParameters {
//!     render_time: 0.002,
//!     ..SimulationParameters::default()
//! });
//! description.domains.push(DomainSpec {
//!     top_left: [0.0, 0.0],
//!     size: [8.0, 8.0],
//!     edges: EdgeMap::uniform(EdgeProperties {
//!         absorption: 1.0,
//!         locally_reacting: false,
//!     }),
//! });
//! description.speakers.push([4.0, 4.0]);
//! description.receivers.push([5.0, 4.0]);
//!
//! let mut kernel = Kernel::new(&description).unwrap();
//! assert!(kernel.metadata().frame_count > 0);
//! kernel.run(Strategy::Sequential, &mut NullCallback).unwrap();
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tympan-core` | IDs, geometry, fields, settings, scene descriptions, errors |
//! | [`spectral`] | `tympan-spectral` | Wavenumber cache, density interfaces, the windowed FFT derivative |
//! | [`scene`] | `tympan-scene` | Domain arena, PML synthesis, per-stage update operations |
//! | [`solver`] | `tympan-solver` | The kernel facade, frame loop, and execution strategies |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and vocabulary (`tympan-core`).
///
/// Grid geometry ([`types::Rect`], [`types::Point`]), scalar fields
/// ([`types::Field2`]), simulation settings with their derived
/// quantities ([`types::Settings`]), scene descriptions, the
/// [`types::SimulationCallback`] trait, and error types.
pub use tympan_core as types;

/// Spectral machinery (`tympan-spectral`).
///
/// The memoized [`spectral::WavenumberCache`], density-interface
/// coefficients ([`spectral::rho_array`]), and the windowed FFT
/// derivative ([`spectral::row_derivative`]).
pub use tympan_spectral as spectral;

/// Scene assembly and per-domain state (`tympan-scene`).
///
/// [`scene::Scene`] owns the configured air domains plus the absorbing
/// layers synthesized around them, and provides the derivative, update,
/// and probe-sampling operations the solver drives each frame.
pub use tympan_scene as scene;

/// The time-integration loop (`tympan-solver`).
///
/// [`solver::Kernel`] validates a scene description, assembles the
/// scene, and drives the six-stage Runge-Kutta frame loop.
pub use tympan_solver as solver;

/// Common imports for typical tympan usage.
///
/// ```rust
/// use tympan::prelude::*;
/// ```
///
/// This imports the most frequently used types: the scene description
/// builders, the kernel, execution strategies, and the callback trait.
pub mod prelude {
    // Scene description
    pub use tympan_core::{
        DomainSpec, EdgeMap, EdgeProperties, SceneDescription, SimulationParameters,
    };

    // IDs and geometry
    pub use tympan_core::{Axis, Direction, DomainId, Point, ReceiverId, Rect, Size};

    // Callbacks
    pub use tympan_core::{NullCallback, SimulationCallback, SimulationStatus};

    // Errors
    pub use tympan_core::{ConfigError, KernelError, SceneError, SolverError};

    // Kernel
    pub use tympan_solver::{DomainMetadata, Kernel, SimulationMetadata, Strategy};
}
