//! Menger subdivision: which sub-cubes exist and where their centers are.
//!
//! A cube is cut into a 3x3x3 grid. The center sub-cube and the six
//! face-center sub-cubes are removed, keeping 20 of 27. In offset terms,
//! every triple in `{-1, 0, 1}^3` with at most one zero coordinate survives.
//!
//! Generation is a pure function of the parent centers and the level. The
//! output is parent-major, then in [`CHILD_OFFSETS`] order, and always
//! holds exactly `20 * parents` centers.

use sponge_types::{Cell, CellId, Point3};

/// Sub-cubes kept per subdivision.
pub const CHILDREN_PER_CELL: usize = 20;

/// Unit offsets of the 20 kept sub-cubes, in canonical order.
///
/// Ordered by x, then y, then z, each running `-1, 0, 1`.
pub const CHILD_OFFSETS: [[i8; 3]; CHILDREN_PER_CELL] = menger_offsets();

#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
const fn menger_offsets() -> [[i8; 3]; CHILDREN_PER_CELL] {
    let mut out = [[0_i8; 3]; CHILDREN_PER_CELL];
    let mut n = 0;
    let mut x = -1_i8;
    while x <= 1 {
        let mut y = -1_i8;
        while y <= 1 {
            let mut z = -1_i8;
            while z <= 1 {
                let centered = (x == 0) as u8 + (y == 0) as u8 + (z == 0) as u8;
                // Two or more centered axes: the body center or a face center.
                if centered < 2 {
                    out[n] = [x, y, z];
                    n += 1;
                }
                z += 1;
            }
            y += 1;
        }
        x += 1;
    }
    out
}

/// Edge length of a cell at `level + 1`, which is also the distance from a
/// level-`level` parent center to its children along each offset axis.
///
/// Levels too deep to represent return 0.
pub fn child_scale(level: u32) -> f64 {
    level
        .checked_add(1)
        .and_then(|next| i32::try_from(next).ok())
        .map_or(0.0, |exp| 3.0_f64.powi(exp).recip())
}

/// Lazily produce the child centers of `parents` at `level`.
///
/// Nothing is allocated; consumers that filter the candidates (such as the
/// defect sampler) never hold the full candidate list.
pub fn children(parents: &[Point3], level: u32) -> impl Iterator<Item = Point3> + '_ {
    let scale = child_scale(level);
    parents.iter().flat_map(move |&parent| {
        CHILD_OFFSETS
            .iter()
            .map(move |&offset| parent.displaced(offset, scale))
    })
}

/// Collect the child centers of `parents` at `level`.
pub fn generate_children(parents: &[Point3], level: u32) -> Vec<Point3> {
    let mut out = Vec::with_capacity(parents.len().saturating_mul(CHILDREN_PER_CELL));
    out.extend(children(parents, level));
    out
}

/// Hands out sequential [`CellId`]s for one provenance tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellIdAllocator {
    next: u64,
}

impl CellIdAllocator {
    /// Start numbering at 0.
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Return the next unused identifier.
    pub const fn allocate(&mut self) -> CellId {
        let id = CellId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// Number of identifiers handed out so far.
    pub const fn allocated(&self) -> u64 {
        self.next
    }
}

/// Subdivide `parents` into child [`Cell`]s that remember their parent.
///
/// Geometry and ordering match [`generate_children`]; each child sits one
/// level below its own parent.
pub fn child_cells(parents: &[Cell], ids: &mut CellIdAllocator) -> Vec<Cell> {
    let mut out = Vec::with_capacity(parents.len().saturating_mul(CHILDREN_PER_CELL));
    for parent in parents {
        let scale = child_scale(parent.level);
        let level = parent.level.saturating_add(1);
        for &offset in &CHILD_OFFSETS {
            out.push(Cell {
                id: ids.allocate(),
                level,
                position: parent.position.displaced(offset, scale),
                parent_id: Some(parent.id),
            });
        }
    }
    out
}
