//! Error types for the tympan workspace, organized by subsystem:
//! configuration, scene construction, and the solver.

use std::error::Error;
use std::fmt;

use crate::config::ProbeKind;
use crate::geometry::Direction;
use crate::id::DomainId;

/// Errors raised while validating a scene description or deriving
/// settings from raw parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A raw parameter is out of range.
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// No tabulated grid spacing resolves the requested frequency.
    GridSpacingUnresolvable {
        /// The frequency that could not be accommodated.
        max_frequency: f64,
    },
    /// A domain rectangle has a non-positive extent.
    DegenerateDomain {
        /// Index of the domain in the scene description.
        index: usize,
    },
    /// The scene contains no domains.
    EmptyScene,
    /// A speaker or receiver lies outside every domain.
    UnplacedProbe {
        /// Which kind of probe.
        kind: ProbeKind,
        /// Index within its list in the scene description.
        index: usize,
        /// World-space x, metres.
        x: f64,
        /// World-space y, metres.
        y: f64,
    },
    /// A speaker or receiver lies inside more than one domain,
    /// which means the domains themselves overlap.
    AmbiguousProbeLocation {
        /// Which kind of probe.
        kind: ProbeKind,
        /// Index within its list in the scene description.
        index: usize,
    },
    /// An edge absorption coefficient is outside `[0, 1]`.
    InvalidAbsorption {
        /// Index of the domain in the scene description.
        index: usize,
        /// The edge carrying the bad coefficient.
        direction: Direction,
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter '{name}': {reason}")
            }
            Self::GridSpacingUnresolvable { max_frequency } => {
                write!(
                    f,
                    "no grid spacing in the table resolves {max_frequency} Hz"
                )
            }
            Self::DegenerateDomain { index } => {
                write!(f, "domain {index} has a non-positive extent")
            }
            Self::EmptyScene => write!(f, "scene contains no domains"),
            Self::UnplacedProbe { kind, index, x, y } => {
                write!(f, "{kind} {index} at ({x}, {y}) lies outside every domain")
            }
            Self::AmbiguousProbeLocation { kind, index } => {
                write!(f, "{kind} {index} lies inside more than one domain")
            }
            Self::InvalidAbsorption {
                index,
                direction,
                value,
            } => {
                write!(
                    f,
                    "domain {index} {direction} edge has absorption {value} outside [0, 1]"
                )
            }
        }
    }
}

impl Error for ConfigError {}

/// Errors raised while assembling or querying scene topology.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneError {
    /// Two domains overlap instead of merely sharing an edge.
    OverlappingDomains {
        /// First domain.
        a: DomainId,
        /// Second domain.
        b: DomainId,
    },
    /// A lookup referenced a domain that is not in the arena.
    UnknownDomain {
        /// The missing ID.
        id: DomainId,
    },
    /// A receiver's interpolation stencil needs a neighbour the
    /// topology does not provide.
    MissingNeighbour {
        /// The domain lacking the neighbour.
        domain: DomainId,
        /// The side on which it is missing.
        direction: Direction,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverlappingDomains { a, b } => {
                write!(f, "domains {a} and {b} overlap")
            }
            Self::UnknownDomain { id } => write!(f, "unknown domain {id}"),
            Self::MissingNeighbour { domain, direction } => {
                write!(f, "domain {domain} has no {direction} neighbour")
            }
        }
    }
}

impl Error for SceneError {}

/// Errors raised by the solver during a run.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// The selected execution strategy is not available in this build.
    StrategyUnavailable {
        /// Name of the strategy.
        strategy: &'static str,
    },
    /// Scene topology failed mid-run.
    Scene {
        /// The underlying topology error.
        reason: SceneError,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrategyUnavailable { strategy } => {
                write!(f, "execution strategy '{strategy}' is not available")
            }
            Self::Scene { reason } => write!(f, "scene error: {reason}"),
        }
    }
}

impl Error for SolverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Scene { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Top-level error for kernel initialization and runs.
#[derive(Clone, Debug, PartialEq)]
pub enum KernelError {
    /// The scene description or parameters were rejected.
    Config(ConfigError),
    /// Scene assembly failed.
    Scene(SceneError),
    /// The run itself failed.
    Solver(SolverError),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::Scene(e) => write!(f, "scene error: {e}"),
            Self::Solver(e) => write!(f, "solver error: {e}"),
        }
    }
}

impl Error for KernelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Scene(e) => Some(e),
            Self::Solver(e) => Some(e),
        }
    }
}

impl From<ConfigError> for KernelError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SceneError> for KernelError {
    fn from(e: SceneError) -> Self {
        Self::Scene(e)
    }
}

impl From<SolverError> for KernelError {
    fn from(e: SolverError) -> Self {
        Self::Solver(e)
    }
}
