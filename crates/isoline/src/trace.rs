//! Contour tracing: follow one iso-line through the grid, cell by cell.
//!
//! A trace starts on a cell side where the field changes sign relative to
//! the contour level, then repeatedly leaves the current cell through the
//! one other side the line must cross. Saddle cells, where three other
//! sides are crossed, are resolved from the crossing positions. The walk
//! ends when it returns to its starting edge (closed), leaves the grid,
//! or runs into a NaN region. On longitude-periodic grids, leaving
//! through the east or west boundary wraps to the opposite column.
//!
//! [`LevelSweep`] drives repeated traces over every edge of the grid for
//! one level, owning the [`EdgeVisitationSet`] and a resumable cursor.
//!
//! # Cell layout
//!
//! Cell `(col, row)` spans nodes `col..=col + 1` and `row..=row + 1`
//! (row 0 is the northern row). Its corners are numbered counterclockwise
//! from the south-west, and side `k` runs from corner `k` to corner
//! `k + 1`:
//!
//! ```text
//!   3 ----N(2)---- 2
//!   |              |
//!  W(3)          E(1)
//!   |              |
//!   0 ----S(0)---- 1
//! ```

use serde::{Deserialize, Serialize};

use crate::edges::{EdgeVisitationSet, Orientation};
use crate::grid::ScalarField;
use crate::periodic::{encloses_pole, remove_longitude_jumps, unwrap_angles};
use crate::splice::stitch;
use crate::types::{FULL_TURN, Path, Point, TraceError};

/// One side of a grid cell, in counterclockwise order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bottom side, west to east.
    South,
    /// Right side, south to north.
    East,
    /// Top side, east to west.
    North,
    /// Left side, north to south.
    West,
}

impl Side {
    const ALL: [Self; 4] = [Self::South, Self::East, Self::North, Self::West];

    /// Position in counterclockwise order, starting at south.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::South => 0,
            Self::East => 1,
            Self::North => 2,
            Self::West => 3,
        }
    }

    /// The side with counterclockwise position `i % 4`.
    #[must_use]
    pub const fn from_index(i: usize) -> Self {
        Self::ALL[i % 4]
    }

    /// The side across the cell.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }
}

/// A side of a specific cell: where a trace enters or leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellSide {
    /// Cell column (the west node column of the cell).
    pub col: usize,
    /// Cell row (the north node row of the cell).
    pub row: usize,
    /// Which side of the cell.
    pub side: Side,
}

impl CellSide {
    /// Create a new cell side.
    #[must_use]
    pub const fn new(col: usize, row: usize, side: Side) -> Self {
        Self { col, row, side }
    }
}

/// Where crossing a cell side leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Into a neighbouring cell, entering through the returned side.
    Inside(CellSide),
    /// Across the periodic east/west seam.
    Wrapped(CellSide),
    /// Off the grid.
    Outside,
}

/// A traced contour before orientation, smoothing, and labelling.
#[derive(Debug, Clone, PartialEq)]
pub struct RawContour {
    /// Vertices in plot coordinates.
    pub path: Path,
    /// The trace returned to its starting edge; `path` is exactly closed.
    pub closed: bool,
    /// At least one end of the trace stopped at a NaN region.
    pub nan_terminated: bool,
    /// Number of periodic wrap steps in `path`.
    pub dateline_crossings: usize,
    /// Edge bits newly set by this trace.
    pub crossings: usize,
    /// The path was assembled from two traces leaving one starting edge.
    pub stitched: bool,
}

/// Walks contours of one level through a borrowed grid.
pub struct ContourTracer<'g, G: ScalarField + ?Sized> {
    grid: &'g G,
    level: f64,
    nudge: f64,
}

impl<'g, G: ScalarField + ?Sized> ContourTracer<'g, G> {
    /// A tracer for `level` over `grid`.
    #[must_use]
    pub fn new(grid: &'g G, level: f64) -> Self {
        Self {
            grid,
            level,
            nudge: f64::EPSILON * level.abs().max(1.0),
        }
    }

    /// The contour level being traced.
    #[must_use]
    pub const fn level(&self) -> f64 {
        self.level
    }

    /// Node value relative to the level. Values exactly on the level are
    /// nudged upward so the strict sign test still sees a crossing.
    #[allow(clippy::float_cmp)]
    fn relative(&self, col: usize, row: usize) -> f64 {
        let d = self.grid.value(col, row) - self.level;
        if d == 0.0 { self.nudge } else { d }
    }

    /// Relative corner values in counterclockwise order, first repeated.
    fn corners(&self, col: usize, row: usize) -> [f64; 5] {
        let sw = self.relative(col, row + 1);
        [
            sw,
            self.relative(col + 1, row + 1),
            self.relative(col + 1, row),
            self.relative(col, row),
            sw,
        ]
    }

    /// Corner values with angular jumps removed when the grid holds angles.
    fn cell_values(&self, col: usize, row: usize) -> [f64; 5] {
        let mut z = self.corners(col, row);
        if self.grid.is_angular() {
            unwrap_angles(&mut z[..4]);
            z[4] = z[0];
        }
        z
    }

    /// Fractional node coordinates of corner `k` of a cell.
    #[allow(clippy::cast_precision_loss)]
    const fn corner_position(col: usize, row: usize, k: usize) -> (f64, f64) {
        let (c, r) = match k % 4 {
            0 => (col, row + 1),
            1 => (col + 1, row + 1),
            2 => (col + 1, row),
            _ => (col, row),
        };
        (c as f64, r as f64)
    }

    /// Plot position of the crossing at fraction `t` along a cell side.
    fn crossing_point(&self, at: CellSide, t: f64) -> Point {
        let k = at.side.index();
        let (c0, r0) = Self::corner_position(at.col, at.row, k);
        let (c1, r1) = Self::corner_position(at.col, at.row, k + 1);
        self.grid
            .to_plot(t.mul_add(c1 - c0, c0), t.mul_add(r1 - r0, r0))
    }

    /// Canonical node column of a vertical edge; the periodic seam is
    /// stored once, at column 0.
    fn seam_column(&self, col: usize) -> usize {
        if self.grid.is_periodic_x() && col + 1 == self.grid.n_cols() {
            0
        } else {
            col
        }
    }

    /// Bit-plane and linear index of the grid edge under a cell side.
    fn edge_key(&self, at: CellSide) -> (Orientation, usize) {
        let n_cols = self.grid.n_cols();
        match at.side {
            Side::South => (Orientation::Horizontal, (at.row + 1) * n_cols + at.col),
            Side::North => (Orientation::Horizontal, at.row * n_cols + at.col),
            Side::West => (
                Orientation::Vertical,
                at.row * n_cols + self.seam_column(at.col),
            ),
            Side::East => (
                Orientation::Vertical,
                at.row * n_cols + self.seam_column(at.col + 1),
            ),
        }
    }

    /// The cell and entry side reached by crossing `at`.
    fn neighbor(&self, at: CellSide) -> Step {
        let last_col = self.grid.n_cols() - 2;
        let last_row = self.grid.n_rows() - 2;
        let periodic = self.grid.is_periodic_x();
        match at.side {
            Side::South if at.row < last_row => {
                Step::Inside(CellSide::new(at.col, at.row + 1, Side::North))
            }
            Side::North if at.row > 0 => {
                Step::Inside(CellSide::new(at.col, at.row - 1, Side::South))
            }
            Side::East if at.col < last_col => {
                Step::Inside(CellSide::new(at.col + 1, at.row, Side::West))
            }
            Side::East if periodic => Step::Wrapped(CellSide::new(0, at.row, Side::West)),
            Side::West if at.col > 0 => {
                Step::Inside(CellSide::new(at.col - 1, at.row, Side::East))
            }
            Side::West if periodic => {
                Step::Wrapped(CellSide::new(last_col, at.row, Side::East))
            }
            _ => Step::Outside,
        }
    }

    /// Trace the contour entering the cell through `start`.
    ///
    /// Returns `Ok(None)` if the edge was already visited or the field does
    /// not cross the level along it.
    ///
    /// # Errors
    ///
    /// Returns a [`TraceError`] if the path could not grow or an edge
    /// index fell outside `edges`. No partial path is returned.
    pub fn trace(
        &self,
        edges: &mut EdgeVisitationSet,
        start: CellSide,
    ) -> Result<Option<RawContour>, TraceError> {
        self.trace_from(edges, start, true)
    }

    fn trace_from(
        &self,
        edges: &mut EdgeVisitationSet,
        start: CellSide,
        check_visited: bool,
    ) -> Result<Option<RawContour>, TraceError> {
        let start_key = self.edge_key(start);
        if check_visited && edges.get(start_key.0, start_key.1)? {
            return Ok(None);
        }

        let z = self.corners(start.col, start.row);
        let k = start.side.index();
        let mut pair = [z[k], z[k + 1]];
        if self.grid.is_angular() {
            unwrap_angles(&mut pair);
        }
        // Also false when either value is NaN.
        let crosses = pair[0] * pair[1] < 0.0;
        if !crosses {
            return Ok(None);
        }

        let t = pair[0] / (pair[0] - pair[1]);
        let mut path = Path::default();
        path.try_push(self.crossing_point(start, t))?;
        let mut crossings = usize::from(edges.set(start_key.0, start_key.1)?);

        let mut current = start;
        let mut closed = false;
        let mut nan_terminated = false;
        let mut dateline_crossings = 0;

        loop {
            let z = self.cell_values(current.col, current.row);
            let entry = current.side.index();
            let mut fractions = [f64::NAN; 4];
            let mut exit = None;
            let mut n_exits = 0;
            let mut n_nan = 0;

            for k in 0..4 {
                let (a, b) = (z[k], z[k + 1]);
                if a.is_nan() || b.is_nan() {
                    if k != entry {
                        n_nan += 1;
                    }
                    continue;
                }
                if a * b < 0.0 {
                    fractions[k] = a / (a - b);
                    if k != entry {
                        n_exits += 1;
                        exit.get_or_insert(k);
                    }
                }
            }

            let exit = match (n_exits, exit) {
                (1, Some(k)) => k,
                (3, _) => resolve_saddle(entry, &fractions),
                (0, _) => {
                    nan_terminated = n_nan > 0;
                    break;
                }
                // Two exits cannot follow a genuine entry crossing.
                _ => break,
            };

            let leaving = CellSide::new(current.col, current.row, Side::from_index(exit));
            path.try_push(self.crossing_point(leaving, fractions[exit]))?;
            let key = self.edge_key(leaving);
            let fresh = edges.set(key.0, key.1)?;
            crossings += usize::from(fresh);

            let step = self.neighbor(leaving);
            if let Step::Wrapped(_) = step
                && let Some(&last) = path.last()
            {
                let shift = if leaving.side == Side::East {
                    -FULL_TURN
                } else {
                    FULL_TURN
                };
                path.try_push(Point::new(last.x + shift, last.y))?;
                dateline_crossings += 1;
            }

            if key == start_key {
                path.close();
                closed = true;
                break;
            }
            if !fresh {
                break;
            }
            match step {
                Step::Inside(next) | Step::Wrapped(next) => current = next,
                Step::Outside => break,
            }
        }

        if dateline_crossings > 0 {
            settle_longitudes(&mut path);
        }

        Ok(Some(RawContour {
            path,
            closed,
            nan_terminated,
            dateline_crossings,
            crossings,
            stitched: false,
        }))
    }
}

/// Pick the exit side of a saddle cell entered through side `entry`.
///
/// The sums of the crossing fractions on the entry/opposite pair and on
/// the other pair decide which neighbouring side the line leaves through.
/// Exactly equal sums connect south with west and east with north.
#[allow(clippy::float_cmp)]
fn resolve_saddle(entry: usize, fractions: &[f64; 4]) -> usize {
    let across = fractions[entry] + fractions[(entry + 2) % 4];
    let beside = fractions[(entry + 1) % 4] + fractions[(entry + 3) % 4];
    if across == beside {
        3 - entry
    } else if across > beside {
        (entry + 1) % 4
    } else {
        (entry + 3) % 4
    }
}

/// Clean up a path that crossed the dateline: unless it circles a pole,
/// remove any residual longitude jumps.
fn settle_longitudes(path: &mut Path) {
    if encloses_pole(path.points()) {
        return;
    }
    let mut points = std::mem::take(path).into_points();
    remove_longitude_jumps(&mut points);
    *path = Path::new(points);
}

/// Stage of a level sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    South,
    East,
    North,
    West,
    InteriorHorizontal,
    InteriorVertical,
    Done,
}

impl Phase {
    const fn next(self) -> Self {
        match self {
            Self::South => Self::East,
            Self::East => Self::North,
            Self::North => Self::West,
            Self::West => Self::InteriorHorizontal,
            Self::InteriorHorizontal => Self::InteriorVertical,
            Self::InteriorVertical | Self::Done => Self::Done,
        }
    }

    const fn is_interior(self) -> bool {
        matches!(self, Self::InteriorHorizontal | Self::InteriorVertical)
    }
}

/// Resumable position within a level sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SweepCursor {
    phase: Phase,
    index: usize,
}

/// Every contour of one level, traced edge by edge.
///
/// Boundary edges are swept first (south, east, north, west; east and
/// west are skipped on periodic grids), so open contours are traced from
/// one grid boundary to the other in a single pass. Interior edges follow;
/// a trace from an interior edge that does not close has run into NaN on
/// one end, so it is traced again from the same edge in the other
/// direction and the two halves are stitched.
///
/// Dropping the sweep part-way is always safe; a new sweep of the same
/// level starts over with a fresh [`EdgeVisitationSet`].
pub struct LevelSweep<'g, G: ScalarField + ?Sized> {
    tracer: ContourTracer<'g, G>,
    edges: EdgeVisitationSet,
    cursor: SweepCursor,
}

impl<'g, G: ScalarField + ?Sized> LevelSweep<'g, G> {
    /// Start a sweep of `level` over `grid`.
    #[must_use]
    pub fn new(grid: &'g G, level: f64) -> Self {
        let degenerate = grid.n_cols() < 2 || grid.n_rows() < 2;
        Self {
            tracer: ContourTracer::new(grid, level),
            edges: EdgeVisitationSet::new(grid.n_cols(), grid.n_rows()),
            cursor: SweepCursor {
                phase: if degenerate { Phase::Done } else { Phase::South },
                index: 0,
            },
        }
    }

    /// The edges visited so far.
    #[must_use]
    pub const fn edges(&self) -> &EdgeVisitationSet {
        &self.edges
    }

    /// Consume the sweep, returning the visitation set.
    #[must_use]
    pub fn into_edges(self) -> EdgeVisitationSet {
        self.edges
    }

    /// The starting side for `index` within `phase`, or `None` once the
    /// phase is exhausted.
    fn start_at(&self, phase: Phase, index: usize) -> Option<CellSide> {
        let grid = self.tracer.grid;
        let cells_x = grid.n_cols() - 1;
        let cells_y = grid.n_rows() - 1;
        let periodic = grid.is_periodic_x();
        match phase {
            Phase::South => {
                (index < cells_x).then(|| CellSide::new(index, cells_y - 1, Side::South))
            }
            Phase::East => (!periodic && index < cells_y)
                .then(|| CellSide::new(cells_x - 1, index, Side::East)),
            Phase::North => (index < cells_x).then(|| CellSide::new(index, 0, Side::North)),
            Phase::West => (!periodic && index < cells_y).then(|| CellSide::new(0, index, Side::West)),
            Phase::InteriorHorizontal => (index < (cells_y - 1) * cells_x)
                .then(|| CellSide::new(index % cells_x, 1 + index / cells_x, Side::North)),
            Phase::InteriorVertical => {
                let first = usize::from(!periodic);
                (index < (cells_x - first) * cells_y)
                    .then(|| CellSide::new(first + index / cells_y, index % cells_y, Side::West))
            }
            Phase::Done => None,
        }
    }

    /// Trace back from an interior start that did not close and stitch
    /// the two halves together.
    fn complete(&mut self, start: CellSide, first: RawContour) -> Result<RawContour, TraceError> {
        let (back_start, wrapped) = match self.tracer.neighbor(start) {
            Step::Inside(cs) => (cs, false),
            Step::Wrapped(cs) => (cs, true),
            Step::Outside => return Ok(first),
        };
        let Some(second) = self.tracer.trace_from(&mut self.edges, back_start, false)? else {
            return Ok(first);
        };
        let mut back = second.path.into_points();
        if wrapped
            && let (Some(&a), Some(b)) = (first.path.first(), back.first_mut())
        {
            // The seam crossing seen from the east column; pin it to an
            // exact wrap twin of the western start so stitching keeps it.
            *b = Point::new(a.x + FULL_TURN, a.y);
        }
        let mut path = stitch(first.path, Path::new(back));
        let dateline_crossings =
            first.dateline_crossings + second.dateline_crossings + usize::from(wrapped);
        if dateline_crossings > 0 {
            settle_longitudes(&mut path);
        }
        Ok(RawContour {
            path,
            closed: false,
            nan_terminated: first.nan_terminated || second.nan_terminated,
            dateline_crossings,
            crossings: first.crossings + second.crossings,
            stitched: true,
        })
    }
}

impl<G: ScalarField + ?Sized> Iterator for LevelSweep<'_, G> {
    type Item = Result<RawContour, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let SweepCursor { phase, index } = self.cursor;
            if phase == Phase::Done {
                return None;
            }
            let Some(start) = self.start_at(phase, index) else {
                self.cursor = SweepCursor {
                    phase: phase.next(),
                    index: 0,
                };
                continue;
            };
            self.cursor.index += 1;

            let raw = match self.tracer.trace(&mut self.edges, start) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            };
            let raw = if phase.is_interior() && !raw.closed {
                match self.complete(start, raw) {
                    Ok(raw) => raw,
                    Err(e) => return Some(Err(e)),
                }
            } else {
                raw
            };
            tracing::trace!(
                level = self.tracer.level,
                points = raw.path.len(),
                closed = raw.closed,
                stitched = raw.stitched,
                "traced contour"
            );
            return Some(Ok(raw));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::grid::{Grid, GridHeader};

    fn unit_cell(nw: f64, ne: f64, sw: f64, se: f64) -> Grid {
        Grid::new(GridHeader::new(0.0, 1.0, 0.0, 1.0), 2, 2, vec![nw, ne, sw, se]).unwrap()
    }

    fn sweep(grid: &Grid, level: f64) -> Vec<RawContour> {
        LevelSweep::new(grid, level).map(Result::unwrap).collect()
    }

    #[test]
    fn side_opposites() {
        assert_eq!(Side::South.opposite(), Side::North);
        assert_eq!(Side::East.opposite(), Side::West);
        assert_eq!(Side::from_index(5), Side::East);
    }

    #[test]
    fn no_crossing_returns_none() {
        let grid = unit_cell(0.0, 0.0, 0.0, 0.0);
        let tracer = ContourTracer::new(&grid, 1.0);
        let mut edges = EdgeVisitationSet::new(2, 2);
        let result = tracer
            .trace(&mut edges, CellSide::new(0, 0, Side::South))
            .unwrap();
        assert!(result.is_none());
        assert_eq!(edges.count_set(), 0);
    }

    #[test]
    fn nan_edge_returns_none() {
        let grid = unit_cell(0.0, 0.0, f64::NAN, 2.0);
        let tracer = ContourTracer::new(&grid, 1.0);
        let mut edges = EdgeVisitationSet::new(2, 2);
        assert!(
            tracer
                .trace(&mut edges, CellSide::new(0, 0, Side::South))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn visited_edge_is_not_retraced() {
        let grid = unit_cell(0.0, 1.0, 1.0, 2.0);
        let tracer = ContourTracer::new(&grid, 1.5);
        let mut edges = EdgeVisitationSet::new(2, 2);
        let start = CellSide::new(0, 0, Side::South);
        assert!(tracer.trace(&mut edges, start).unwrap().is_some());
        assert!(tracer.trace(&mut edges, start).unwrap().is_none());
    }

    #[test]
    fn corner_cut_interpolates_both_edges() {
        // SW = 1, SE = 2, NE = 1, NW = 0; level 1.5 cuts S and E at their midpoints.
        let grid = unit_cell(0.0, 1.0, 1.0, 2.0);
        let contours = sweep(&grid, 1.5);
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert!(!c.closed);
        assert_eq!(c.path.points(), &[Point::new(0.5, 0.0), Point::new(1.0, 0.5)]);
        assert_eq!(c.crossings, 2);
    }

    #[test]
    fn saddle_prefers_larger_entry_pair_sum() {
        // Positive SW/NE corners dominate, so from the south the line turns east.
        let grid = unit_cell(-1.0, 3.0, 3.0, -1.0);
        let contours = sweep(&grid, 0.0);
        assert_eq!(contours.len(), 2);
        let first = &contours[0];
        assert_eq!(first.path.len(), 2);
        assert!((first.path.points()[1].x - 1.0).abs() < 1e-12, "exits east");
    }

    #[test]
    fn tied_saddle_connects_south_to_west() {
        let grid = unit_cell(0.0, 2.0, 2.0, 0.0);
        for _ in 0..3 {
            let contours = sweep(&grid, 1.0);
            assert_eq!(contours.len(), 2);
            assert_eq!(
                contours[0].path.points(),
                &[Point::new(0.5, 0.0), Point::new(0.0, 0.5)]
            );
            assert_eq!(
                contours[1].path.points(),
                &[Point::new(1.0, 0.5), Point::new(0.5, 1.0)]
            );
        }
    }

    #[test]
    fn resolve_saddle_tie_rule_is_symmetric() {
        let f = [0.5; 4];
        assert_eq!(resolve_saddle(0, &f), 3);
        assert_eq!(resolve_saddle(3, &f), 0);
        assert_eq!(resolve_saddle(1, &f), 2);
        assert_eq!(resolve_saddle(2, &f), 1);
    }

    #[test]
    fn peak_traces_closed_ring() {
        let mut data = vec![0.0; 25];
        data[12] = 10.0;
        let grid = Grid::new(GridHeader::new(0.0, 4.0, 0.0, 4.0), 5, 5, data).unwrap();
        let contours = sweep(&grid, 5.0);
        assert_eq!(contours.len(), 1);
        let ring = &contours[0];
        assert!(ring.closed);
        assert!(ring.path.is_closed());
        assert_eq!(ring.path.len(), 5);
        assert_eq!(ring.crossings, 4);
    }

    #[test]
    fn node_exactly_on_level_still_contours() {
        let mut data = vec![0.0; 9];
        data[4] = 5.0;
        let grid = Grid::new(GridHeader::new(0.0, 2.0, 0.0, 2.0), 3, 3, data).unwrap();
        let contours = sweep(&grid, 5.0);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].closed);
    }

    #[test]
    fn peak_beside_nan_stitches_both_directions() {
        // The ring around the peak at (2, 1) is cut open by the NaN below it.
        #[rustfmt::skip]
        let data = vec![
            0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 10.0, 0.0, 0.0,
            0.0, 0.0, f64::NAN, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        let grid = Grid::new(GridHeader::new(0.0, 4.0, 0.0, 4.0), 5, 5, data).unwrap();
        let mut sweep = LevelSweep::new(&grid, 5.0);
        let contours: Vec<_> = sweep.by_ref().map(Result::unwrap).collect();
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert!(c.stitched);
        assert!(!c.closed);
        assert!(c.nan_terminated);
        assert_eq!(c.path.len(), 3);
        // Both ends sit on edges next to the NaN node at (2, 2).
        assert_eq!(c.path.points()[0], Point::new(2.5, 3.0));
        assert_eq!(c.path.points()[2], Point::new(1.5, 3.0));
        assert_eq!(c.crossings, sweep.edges().count_set());
    }

    #[test]
    fn periodic_band_wraps_and_closes() {
        // Latitude band of high values: 0.5 contours circle the globe.
        let header = GridHeader::new(0.0, 360.0, -60.0, 60.0).periodic();
        #[rustfmt::skip]
        let data = vec![
            0.0, 0.0, 0.0, 0.0, 0.0,
            1.0, 1.0, 1.0, 1.0, 1.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        let grid = Grid::new(header, 5, 3, data).unwrap();
        let contours = sweep(&grid, 0.5);
        assert_eq!(contours.len(), 2);
        for c in &contours {
            assert!(c.closed);
            assert!(c.path.is_closed());
            assert_eq!(c.dateline_crossings, 1);
            let pts = c.path.points();
            let wraps: Vec<_> = pts
                .windows(2)
                .filter(|w| crate::types::is_wrap_step(w[0], w[1]))
                .collect();
            assert_eq!(wraps.len(), 1);
            assert_eq!(c.crossings, 4);
        }
    }

    #[test]
    fn non_periodic_band_is_open() {
        let header = GridHeader::new(0.0, 360.0, -60.0, 60.0);
        #[rustfmt::skip]
        let data = vec![
            0.0, 0.0, 0.0, 0.0, 0.0,
            1.0, 1.0, 1.0, 1.0, 1.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        let grid = Grid::new(header, 5, 3, data).unwrap();
        let contours = sweep(&grid, 0.5);
        assert_eq!(contours.len(), 2);
        assert!(contours.iter().all(|c| !c.closed && c.dateline_crossings == 0));
        assert!(contours.iter().all(|c| c.path.len() == 5));
    }

    #[test]
    fn angular_values_contour_across_north() {
        // Directions swing through 0/360 between the columns.
        let header = GridHeader::new(0.0, 1.0, 0.0, 1.0).angular();
        let grid = Grid::new(header, 2, 2, vec![350.0, 10.0, 350.0, 10.0]).unwrap();
        let contours = sweep(&grid, 0.0);
        assert_eq!(contours.len(), 1);
        let pts = contours[0].path.points();
        assert!(pts.iter().all(|p| (p.x - 0.5).abs() < 1e-9));
    }

    #[test]
    fn degenerate_grid_yields_nothing() {
        struct Line;
        impl ScalarField for Line {
            fn n_cols(&self) -> usize {
                1
            }
            fn n_rows(&self) -> usize {
                4
            }
            fn value(&self, _: usize, _: usize) -> f64 {
                0.0
            }
            fn is_periodic_x(&self) -> bool {
                false
            }
            fn is_angular(&self) -> bool {
                false
            }
            fn to_plot(&self, col: f64, row: f64) -> Point {
                Point::new(col, row)
            }
            fn to_grid(&self, p: Point) -> (f64, f64) {
                (p.x, p.y)
            }
        }
        assert_eq!(LevelSweep::new(&Line, 0.0).count(), 0);
    }
}
