//! Spectral machinery for the tympan acoustic engine.
//!
//! Spatial derivatives are taken in the wavenumber domain: a field row
//! is extended with windowed contributions from its neighbours, FFT'd,
//! multiplied by a derivative factor, and transformed back. This crate
//! provides the three pieces of that pipeline:
//!
//! - [`WavenumberCache`]: memoized wavenumber discretizations and FFT
//!   plans, bucketed by power-of-two transform length
//! - [`RhoArray`]: reflection and transmission coefficients across a
//!   density interface
//! - [`row_derivative`]: the windowed three-medium derivative itself

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod derivative;
pub mod rho;
pub mod wavenumber;

pub use derivative::{row_derivative, DerivativeInput, DerivativeOutput};
pub use rho::{rho_array, RhoArray, WingCoefficients};
pub use wavenumber::{Discretization, WavenumberCache};
