//! Per-level record of which grid edges a contour has already crossed.
//!
//! Two bit-planes, one per edge orientation, each holding one bit per
//! grid node. A horizontal edge joins nodes `(col, row)` and
//! `(col + 1, row)`; a vertical edge joins `(col, row)` and
//! `(col, row + 1)`. Both are addressed by the linear index of their
//! first node, `row * n_cols + col`.

use bitvec::prelude::{BitVec, Lsb0};
use serde::{Deserialize, Serialize};

use crate::types::TraceError;

/// Orientation of a grid edge, selecting a bit-plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Edge along a node row (south/north side of a cell).
    Horizontal,
    /// Edge along a node column (west/east side of a cell).
    Vertical,
}

/// Bitset over the edges of one grid, for one contour level.
///
/// Bits are only ever set, never cleared: once a contour has crossed an
/// edge, no other trace of the same level may start there. A fresh set
/// is required for each level.
#[derive(Debug, Clone)]
pub struct EdgeVisitationSet {
    n_cols: usize,
    n_rows: usize,
    horizontal: BitVec<u32, Lsb0>,
    vertical: BitVec<u32, Lsb0>,
}

impl EdgeVisitationSet {
    /// An empty set sized for an `n_cols x n_rows` node grid.
    #[must_use]
    pub fn new(n_cols: usize, n_rows: usize) -> Self {
        let bits = n_cols * n_rows;
        Self {
            n_cols,
            n_rows,
            horizontal: BitVec::repeat(false, bits),
            vertical: BitVec::repeat(false, bits),
        }
    }

    const fn plane(&self, orientation: Orientation) -> &BitVec<u32, Lsb0> {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }

    /// Whether the edge has been visited.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::EdgeOutOfBounds`] if `index` does not address
    /// a node of this grid.
    pub fn get(&self, orientation: Orientation, index: usize) -> Result<bool, TraceError> {
        self.plane(orientation)
            .get(index)
            .map(|bit| *bit)
            .ok_or(TraceError::EdgeOutOfBounds { orientation, index })
    }

    /// Mark the edge visited. Returns `true` if the bit was newly set.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::EdgeOutOfBounds`] if `index` does not address
    /// a node of this grid.
    pub fn set(&mut self, orientation: Orientation, index: usize) -> Result<bool, TraceError> {
        let plane = match orientation {
            Orientation::Horizontal => &mut self.horizontal,
            Orientation::Vertical => &mut self.vertical,
        };
        let mut bit = plane
            .get_mut(index)
            .ok_or(TraceError::EdgeOutOfBounds { orientation, index })?;
        let fresh = !*bit;
        *bit = true;
        Ok(fresh)
    }

    /// Number of visited edges across both planes.
    #[must_use]
    pub fn count_set(&self) -> usize {
        self.horizontal.count_ones() + self.vertical.count_ones()
    }

    /// Node columns the set was sized for.
    #[must_use]
    pub const fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Node rows the set was sized for.
    #[must_use]
    pub const fn n_rows(&self) -> usize {
        self.n_rows
    }
}
