//! Core types for the tympan acoustic simulation engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental vocabulary used throughout the tympan workspace:
//! typed IDs, grid geometry, scalar field buffers, simulation settings
//! with their derived quantities, scene descriptions, the progress
//! callback trait, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod callback;
pub mod config;
pub mod error;
pub mod field;
pub mod geometry;
pub mod id;
pub mod settings;

pub use callback::{NullCallback, SimulationCallback, SimulationStatus};
pub use config::{DomainSpec, EdgeMap, EdgeProperties, ProbeKind, SceneDescription};
pub use error::{ConfigError, KernelError, SceneError, SolverError};
pub use field::{Field2, FieldKind};
pub use geometry::{Axis, Direction, Point, Rect, Size};
pub use id::{DomainId, ReceiverId};
pub use settings::{Settings, SimulationParameters, EPSILON, VACUUM_DENSITY};
