//! Read-only scalar grids and their mapping to plot coordinates.
//!
//! The tracer only ever talks to a grid through the [`ScalarField`]
//! trait, so callers with their own storage (memory-mapped rasters,
//! padded GMT-style buffers, ...) can contour without copying. [`Grid`]
//! is the owned, validated implementation used by the engine driver and
//! the tests.
//!
//! Rows run north to south: row 0 is the row at `y_max`.

use serde::{Deserialize, Serialize};

use crate::types::{FULL_TURN, Point};

/// Read access to a 2-D scalar field sampled on a regular grid.
pub trait ScalarField {
    /// Number of node columns.
    fn n_cols(&self) -> usize;

    /// Number of node rows.
    fn n_rows(&self) -> usize;

    /// Value at node `(col, row)`. `NaN` marks missing data.
    fn value(&self, col: usize, row: usize) -> f64;

    /// Whether the east and west boundary columns are the same meridian.
    fn is_periodic_x(&self) -> bool;

    /// Whether values are angles in degrees that wrap at 360.
    fn is_angular(&self) -> bool;

    /// Map fractional node coordinates to plot coordinates.
    fn to_plot(&self, col: f64, row: f64) -> Point;

    /// Map a plot-coordinate point back to fractional node coordinates.
    fn to_grid(&self, point: Point) -> (f64, f64);
}

/// Whether grid values sit on gridline intersections or cell centres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Registration {
    /// Nodes lie on the region boundary (first node at `x_min`).
    #[default]
    Gridline,
    /// Nodes lie at the centres of `n_cols x n_rows` pixels.
    Pixel,
}

/// Geometry and interpretation flags of a [`Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridHeader {
    /// West edge of the region.
    pub x_min: f64,
    /// East edge of the region.
    pub x_max: f64,
    /// South edge of the region.
    pub y_min: f64,
    /// North edge of the region.
    pub y_max: f64,
    /// Node registration.
    #[serde(default)]
    pub registration: Registration,
    /// East/west boundaries are identified (global longitude grid).
    #[serde(default)]
    pub periodic_x: bool,
    /// Values are angles in degrees.
    #[serde(default)]
    pub angular: bool,
}

impl GridHeader {
    /// A gridline-registered, non-periodic header over the given region.
    #[must_use]
    pub const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            registration: Registration::Gridline,
            periodic_x: false,
            angular: false,
        }
    }

    /// Mark the grid as longitude-periodic.
    #[must_use]
    pub const fn periodic(mut self) -> Self {
        self.periodic_x = true;
        self
    }

    /// Mark the grid values as angles.
    #[must_use]
    pub const fn angular(mut self) -> Self {
        self.angular = true;
        self
    }

    /// Use pixel registration.
    #[must_use]
    pub const fn pixel(mut self) -> Self {
        self.registration = Registration::Pixel;
        self
    }
}

/// Reasons a grid is rejected before tracing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Fewer than two node columns or rows.
    #[error("grid must have at least 2x2 nodes, got {n_cols}x{n_rows}")]
    TooSmall {
        /// Node columns.
        n_cols: usize,
        /// Node rows.
        n_rows: usize,
    },

    /// Data length does not match the node count.
    #[error("grid data has {actual} values, expected {expected}")]
    DataLength {
        /// `n_cols * n_rows`.
        expected: usize,
        /// Length of the supplied data.
        actual: usize,
    },

    /// Region extents are not finite or are inverted.
    #[error("grid extents are invalid: {0}")]
    Extent(String),

    /// The periodicity flags do not match the region.
    #[error("inconsistent periodicity: {0}")]
    Periodicity(String),

    /// On a periodic grid, the last column does not repeat the first.
    #[error("periodic grid seam differs in row {row}: {west} vs {east}")]
    Seam {
        /// Node row of the first mismatch.
        row: usize,
        /// Value in column 0.
        west: f64,
        /// Value in the last column.
        east: f64,
    },
}

/// An owned, validated scalar grid in row-major order.
///
/// Deserialized grids go through the same checks as [`Grid::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridParts")]
pub struct Grid {
    header: GridHeader,
    n_cols: usize,
    n_rows: usize,
    data: Vec<f64>,
}

/// Unvalidated wire form of a [`Grid`].
#[derive(Deserialize)]
struct GridParts {
    header: GridHeader,
    n_cols: usize,
    n_rows: usize,
    data: Vec<f64>,
}

impl TryFrom<GridParts> for Grid {
    type Error = GridError;

    fn try_from(parts: GridParts) -> Result<Self, GridError> {
        Self::new(parts.header, parts.n_cols, parts.n_rows, parts.data)
    }
}

/// Tolerance for the periodic x-range check.
const PERIOD_TOLERANCE: f64 = 1e-9;

/// Relative tolerance for matching the two seam columns.
const SEAM_TOLERANCE: f64 = 1e-9;

impl Grid {
    /// Build a grid from row-major data (row 0 is the northern row).
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] if the node counts, data length, extents,
    /// or periodicity flags are inconsistent.
    pub fn new(
        header: GridHeader,
        n_cols: usize,
        n_rows: usize,
        data: Vec<f64>,
    ) -> Result<Self, GridError> {
        let grid = Self {
            header,
            n_cols,
            n_rows,
            data,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Build a grid by evaluating `f(x, y)` at every node's plot position.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Grid::new`].
    pub fn from_fn(
        header: GridHeader,
        n_cols: usize,
        n_rows: usize,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, GridError> {
        let mut grid = Self {
            header,
            n_cols,
            n_rows,
            data: Vec::new(),
        };
        grid.validate_shape()?;
        let mut data = Vec::with_capacity(n_cols * n_rows);
        for row in 0..n_rows {
            for col in 0..n_cols {
                #[allow(clippy::cast_precision_loss)]
                let p = grid.to_plot(col as f64, row as f64);
                data.push(f(p.x, p.y));
            }
        }
        grid.data = data;
        grid.validate()?;
        Ok(grid)
    }

    /// The grid header.
    #[must_use]
    pub const fn header(&self) -> &GridHeader {
        &self.header
    }

    /// Row-major node values.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Minimum and maximum of the non-NaN values, or `None` if every
    /// node is NaN.
    #[must_use]
    pub fn data_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    fn validate_shape(&self) -> Result<(), GridError> {
        if self.n_cols < 2 || self.n_rows < 2 {
            return Err(GridError::TooSmall {
                n_cols: self.n_cols,
                n_rows: self.n_rows,
            });
        }
        let h = &self.header;
        if ![h.x_min, h.x_max, h.y_min, h.y_max]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(GridError::Extent("extents must be finite".to_string()));
        }
        if h.x_max <= h.x_min || h.y_max <= h.y_min {
            return Err(GridError::Extent(format!(
                "x {}..{} / y {}..{} is empty or inverted",
                h.x_min, h.x_max, h.y_min, h.y_max
            )));
        }
        if h.periodic_x {
            if h.registration != Registration::Gridline {
                return Err(GridError::Periodicity(
                    "periodic grids must be gridline-registered".to_string(),
                ));
            }
            let span = h.x_max - h.x_min;
            if (span - FULL_TURN).abs() > PERIOD_TOLERANCE {
                return Err(GridError::Periodicity(format!(
                    "periodic grids must span 360 in x, got {span}"
                )));
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), GridError> {
        self.validate_shape()?;
        let expected = self.n_cols * self.n_rows;
        if self.data.len() != expected {
            return Err(GridError::DataLength {
                expected,
                actual: self.data.len(),
            });
        }
        if self.header.periodic_x {
            self.validate_seam()?;
        }
        Ok(())
    }

    /// The east column of a periodic grid duplicates the west column.
    /// NaN matches NaN; angular values match modulo a full turn.
    fn validate_seam(&self) -> Result<(), GridError> {
        let last = self.n_cols - 1;
        for row in 0..self.n_rows {
            let west = self.data[row * self.n_cols];
            let east = self.data[row * self.n_cols + last];
            let same = if west.is_nan() || east.is_nan() {
                west.is_nan() && east.is_nan()
            } else {
                let mut diff = (west - east).abs();
                if self.header.angular {
                    diff = diff.rem_euclid(FULL_TURN);
                    diff = diff.min(FULL_TURN - diff);
                }
                diff <= SEAM_TOLERANCE * west.abs().max(east.abs()).max(1.0)
            };
            if !same {
                return Err(GridError::Seam { row, west, east });
            }
        }
        Ok(())
    }

    /// Fractions of the region spanned per node step in x and y, and the
    /// node offset for the registration.
    #[allow(clippy::cast_precision_loss)]
    fn node_layout(&self) -> (f64, f64, f64) {
        match self.header.registration {
            Registration::Gridline => ((self.n_cols - 1) as f64, (self.n_rows - 1) as f64, 0.0),
            Registration::Pixel => (self.n_cols as f64, self.n_rows as f64, 0.5),
        }
    }
}

impl ScalarField for Grid {
    fn n_cols(&self) -> usize {
        self.n_cols
    }

    fn n_rows(&self) -> usize {
        self.n_rows
    }

    fn value(&self, col: usize, row: usize) -> f64 {
        self.data
            .get(row * self.n_cols + col)
            .copied()
            .unwrap_or(f64::NAN)
    }

    fn is_periodic_x(&self) -> bool {
        self.header.periodic_x
    }

    fn is_angular(&self) -> bool {
        self.header.angular
    }

    fn to_plot(&self, col: f64, row: f64) -> Point {
        let (nx, ny, offset) = self.node_layout();
        let h = &self.header;
        let fx = (col + offset) / nx;
        let fy = (row + offset) / ny;
        Point::new(
            fx.mul_add(h.x_max - h.x_min, h.x_min),
            (-fy).mul_add(h.y_max - h.y_min, h.y_max),
        )
    }

    fn to_grid(&self, point: Point) -> (f64, f64) {
        let (nx, ny, offset) = self.node_layout();
        let h = &self.header;
        let col = (point.x - h.x_min) / (h.x_max - h.x_min) * nx - offset;
        let row = (h.y_max - point.y) / (h.y_max - h.y_min) * ny - offset;
        (col, row)
    }
}
