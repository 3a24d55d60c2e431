//! The tympan time-integration loop and its public entry point.
//!
//! [`Kernel`] validates a [`tympan_core::SceneDescription`], assembles
//! the scene with its absorbing layers, and drives the six-stage
//! Runge-Kutta frame loop, reporting progress and output through a
//! [`tympan_core::SimulationCallback`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod kernel;
pub mod solver;
pub mod strategy;

pub use kernel::{DomainMetadata, Kernel, SimulationMetadata};
pub use solver::run;
pub use strategy::Strategy;
