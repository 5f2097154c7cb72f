//! Consistent path direction: higher values on a chosen side.

use crate::grid::ScalarField;
use crate::periodic::unwrap_angles;
use crate::trace::Side;
use crate::types::{Path, is_wrap_step};

/// Which side of the path the higher field values lie on, looking along
/// its direction of travel: `1` for the right, `-1` for the left.
///
/// Read from the cell holding the first ordinary (non-wrap) segment.
/// Returns `None` if the path has no such segment, the segment falls
/// outside the grid, or the deciding corner values are NaN or equal.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn handedness<G: ScalarField + ?Sized>(grid: &G, path: &Path) -> Option<i8> {
    let (p0, p1) = path
        .points()
        .windows(2)
        .find(|w| !is_wrap_step(w[0], w[1]))
        .map(|w| (w[0], w[1]))?;
    let (c0, r0) = grid.to_grid(p0);
    let (c1, r1) = grid.to_grid(p1);
    let last_col = grid.n_cols().checked_sub(2)?;
    let last_row = grid.n_rows().checked_sub(2)?;
    let col = cell_index(0.5 * (c0 + c1), last_col)?;
    let row = cell_index(0.5 * (r0 + r1), last_row)?;

    // The start vertex sits on a cell side: the coordinate nearer an
    // integer node line says which one.
    let off_col = (c0 - c0.round()).abs();
    let off_row = (r0 - r0.round()).abs();
    let side = if off_col < off_row {
        if c0.round() <= col as f64 { Side::West } else { Side::East }
    } else if r0.round() <= row as f64 {
        Side::North
    } else {
        Side::South
    };

    // Walking into the cell through side k, corner k + 1 is on the right.
    let (left, right) = side_corners(col, row, side);
    let mut z = [grid.value(left.0, left.1), grid.value(right.0, right.1)];
    if grid.is_angular() {
        unwrap_angles(&mut z);
    }
    let diff = z[1] - z[0];
    if diff > 0.0 {
        Some(1)
    } else if diff < 0.0 {
        Some(-1)
    } else {
        None
    }
}

/// Reverse `path` if needed so that higher values lie on the side given
/// by `desired` (`1` right, `-1` left). `0` leaves the path alone, as
/// does any path whose handedness cannot be read.
#[must_use]
pub fn orient<G: ScalarField + ?Sized>(grid: &G, mut path: Path, desired: i8) -> Path {
    if desired == 0 {
        return path;
    }
    if let Some(actual) = handedness(grid, &path)
        && actual != desired.signum()
    {
        path.reverse();
    }
    path
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cell_index(coordinate: f64, last: usize) -> Option<usize> {
    if !coordinate.is_finite() || coordinate < 0.0 {
        return None;
    }
    Some((coordinate.floor() as usize).min(last))
}

/// Node coordinates of the (left, right) corners of a cell side, seen
/// from outside the cell looking in.
const fn side_corners(col: usize, row: usize, side: Side) -> ((usize, usize), (usize, usize)) {
    let sw = (col, row + 1);
    let se = (col + 1, row + 1);
    let ne = (col + 1, row);
    let nw = (col, row);
    match side {
        Side::South => (sw, se),
        Side::East => (se, ne),
        Side::North => (ne, nw),
        Side::West => (nw, sw),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::grid::{Grid, GridHeader};
    use crate::trace::LevelSweep;
    use crate::types::Point;

    /// Values rise to the east: a north-south contour at x = 1.5.
    fn east_ramp() -> Grid {
        Grid::from_fn(GridHeader::new(0.0, 3.0, 0.0, 3.0), 4, 4, |x, _| x).unwrap()
    }

    #[test]
    fn northward_line_has_higher_values_on_right() {
        let grid = east_ramp();
        let path = Path::new(vec![Point::new(1.5, 0.0), Point::new(1.5, 1.0)]);
        assert_eq!(handedness(&grid, &path), Some(1));
        let mut reversed = path;
        reversed.reverse();
        assert_eq!(handedness(&grid, &reversed), Some(-1));
    }

    #[test]
    fn orient_reverses_when_handedness_disagrees() {
        let grid = east_ramp();
        let path = Path::new(vec![
            Point::new(1.5, 0.0),
            Point::new(1.5, 1.0),
            Point::new(1.5, 2.0),
        ]);
        let left = orient(&grid, path.clone(), -1);
        assert_eq!(left.first(), Some(&Point::new(1.5, 2.0)));
        let right = orient(&grid, path.clone(), 1);
        assert_eq!(right, path);
    }

    #[test]
    fn zero_sign_is_a_no_op() {
        let grid = east_ramp();
        let path = Path::new(vec![Point::new(1.5, 1.0), Point::new(1.5, 0.0)]);
        assert_eq!(orient(&grid, path.clone(), 0), path);
    }

    #[test]
    fn traced_paths_orient_consistently() {
        let grid = Grid::from_fn(GridHeader::new(-2.0, 2.0, -2.0, 2.0), 9, 9, |x, y| {
            (-(x * x + y * y)).exp()
        })
        .unwrap();
        for raw in LevelSweep::new(&grid, 0.5) {
            let path = orient(&grid, raw.unwrap().path, 1);
            assert_eq!(handedness(&grid, &path), Some(1));
        }
    }

    #[test]
    fn nan_corner_leaves_path_alone() {
        let grid = Grid::new(
            GridHeader::new(0.0, 1.0, 0.0, 1.0),
            2,
            2,
            vec![0.0, 1.0, f64::NAN, 1.0],
        )
        .unwrap();
        let path = Path::new(vec![Point::new(0.5, 0.0), Point::new(0.6, 0.5)]);
        assert_eq!(handedness(&grid, &path), None);
        assert_eq!(orient(&grid, path.clone(), -1), path);
    }
}
