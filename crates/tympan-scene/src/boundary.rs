//! Records of shared edges between adjacent domains.

use tympan_core::{Axis, DomainId};

/// A shared edge between two adjacent domains.
///
/// Purely descriptive: the solver works from the per-domain neighbour
/// lists, but the boundary list is useful for inspection and for
/// rendering scene outlines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Boundary {
    /// Domain on the negative side of the edge.
    pub negative: DomainId,
    /// Domain on the positive side of the edge.
    pub positive: DomainId,
    /// The axis the edge's normal points along.
    pub normal: Axis,
    /// Edge coordinate along the normal axis.
    pub position: i32,
    /// Half-open shared span along the edge.
    pub span: (i32, i32),
}
