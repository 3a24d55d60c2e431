//! Scene descriptions, as handed to the kernel.
//!
//! A [`SceneDescription`] is the untrusted input format: world-space
//! rectangles with per-edge material properties, plus speaker and
//! receiver positions in metres. The kernel converts it to grid units
//! and validates it before building a scene.

use std::fmt;

use crate::geometry::Direction;
use crate::settings::SimulationParameters;

/// Material properties of one domain edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeProperties {
    /// Absorption coefficient in `[0, 1]`; 0 is fully reflective.
    pub absorption: f64,
    /// Locally reacting edges suppress tangential velocity updates in
    /// the absorbing layer attached to them.
    pub locally_reacting: bool,
}

impl Default for EdgeProperties {
    fn default() -> Self {
        Self {
            absorption: 0.0,
            locally_reacting: false,
        }
    }
}

/// Per-edge properties of a rectangular domain.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeMap {
    /// Negative-x edge.
    pub left: EdgeProperties,
    /// Positive-x edge.
    pub right: EdgeProperties,
    /// Negative-y edge.
    pub top: EdgeProperties,
    /// Positive-y edge.
    pub bottom: EdgeProperties,
}

impl EdgeMap {
    /// All four edges set to the same properties.
    pub fn uniform(edge: EdgeProperties) -> Self {
        Self {
            left: edge,
            right: edge,
            top: edge,
            bottom: edge,
        }
    }

    /// The properties of the edge facing `direction`.
    pub fn get(&self, direction: Direction) -> EdgeProperties {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Top => self.top,
            Direction::Bottom => self.bottom,
        }
    }
}

/// One rectangular air domain, in world coordinates (metres).
#[derive(Clone, Debug, PartialEq)]
pub struct DomainSpec {
    /// Top-left corner, metres.
    pub top_left: [f64; 2],
    /// Extent, metres; both components must be positive.
    pub size: [f64; 2],
    /// Edge material properties.
    pub edges: EdgeMap,
}

/// Which kind of point probe a position refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeKind {
    /// A sound source.
    Speaker,
    /// A pressure receiver.
    Receiver,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeKind::Speaker => write!(f, "speaker"),
            ProbeKind::Receiver => write!(f, "receiver"),
        }
    }
}

/// A complete scene description: geometry, probes, and parameters.
#[derive(Clone, Debug)]
pub struct SceneDescription {
    /// Raw simulation parameters.
    pub parameters: SimulationParameters,
    /// Air domains, in world coordinates.
    pub domains: Vec<DomainSpec>,
    /// Speaker positions, metres.
    pub speakers: Vec<[f64; 2]>,
    /// Receiver positions, metres.
    pub receivers: Vec<[f64; 2]>,
}

impl SceneDescription {
    /// An empty scene with the given parameters.
    pub fn new(parameters: SimulationParameters) -> Self {
        Self {
            parameters,
            domains: Vec::new(),
            speakers: Vec::new(),
            receivers: Vec::new(),
        }
    }
}
