//! Scene assembly for the tympan acoustic engine.
//!
//! A scene is an arena of rectangular [`Domain`]s addressed by
//! [`tympan_core::DomainId`]: the configured air domains plus the
//! absorbing (PML) layers synthesized around them. The [`Scene`] owns
//! all per-domain field state and provides the derivative, update, and
//! probe-sampling operations the solver drives each frame.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod domain;
pub mod probe;
pub mod scene;

pub use boundary::Boundary;
pub use domain::{Domain, DomainKind, PmlAttenuation};
pub use probe::{Receiver, Speaker};
pub use scene::{Scene, StepDerivatives};
