//! Per-cell provenance records.
//!
//! The energy accounting only needs aggregate counts and the realized point
//! cloud. A [`Cell`] additionally remembers which parent produced it, for
//! callers that want the full subdivision tree.

use serde::{Deserialize, Serialize};

use crate::point::Point3;

/// Sequential identifier of a cell within one provenance tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId(pub u64);

impl CellId {
    /// Return the inner sequence number.
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for CellId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "cell-{}", self.0)
    }
}

/// One geometric sub-cube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Identifier, unique within its tree.
    pub id: CellId,
    /// Subdivision level (the root cube is level 0).
    pub level: u32,
    /// Center of the cube.
    pub position: Point3,
    /// The cell this one was subdivided from (`None` for the root).
    pub parent_id: Option<CellId>,
}

impl Cell {
    /// The root cell: level 0, centered in the unit cube, no parent.
    pub const fn root(id: CellId) -> Self {
        Self {
            id,
            level: 0,
            position: Point3::CENTROID,
            parent_id: None,
        }
    }
}
