//! Strongly-typed identifiers for scene entities.

use std::fmt;

/// Identifies a domain within a scene.
///
/// Domains live in an arena owned by the scene and are assigned
/// sequential IDs in insertion order. `DomainId(n)` is the n-th domain
/// added, counting both configured domains and synthesized absorbing
/// layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(pub u32);

impl DomainId {
    /// Index into the scene's domain arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DomainId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a receiver (pressure probe) within a scene.
///
/// Receivers are assigned sequential IDs in the order they appear in
/// the scene description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReceiverId(pub u32);

impl ReceiverId {
    /// Index into the scene's receiver list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ReceiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ReceiverId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
