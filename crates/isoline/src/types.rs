//! Shared types for the isoline contouring engine.

use std::collections::TryReserveError;

use serde::{Deserialize, Serialize};

use crate::grid::GridError;

/// An RGBA colour, one byte per channel.
pub type Rgba = [u8; 4];

/// Longitude span of one full revolution.
pub const FULL_TURN: f64 = 360.0;

/// A 2D point in plot coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (longitude for geographic grids).
    pub x: f64,
    /// Vertical position (latitude for geographic grids).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Linear interpolation from `self` towards `other` by fraction `t`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            t.mul_add(other.x - self.x, self.x),
            t.mul_add(other.y - self.y, self.y),
        )
    }

    /// Bit-for-bit equality of both coordinates.
    #[must_use]
    pub fn bitwise_eq(self, other: Self) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

/// Returns `true` when the step `a -> b` is a periodic wrap: the two
/// vertices differ by exactly one full turn in x and share the same y.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_wrap_step(a: Point, b: Point) -> bool {
    (b.x - a.x).abs() == FULL_TURN && a.y == b.y
}

/// An ordered sequence of vertices in plot coordinates.
///
/// Paths grow by doubling their capacity; growth goes through
/// [`Path::try_push`] so an allocation failure surfaces as a
/// [`TraceError`] instead of aborting the process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path(Vec<Point>);

impl Path {
    /// Create a new path from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the path has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the path.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the path and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Append a point, doubling the capacity when full.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Allocation`] if the backing storage could
    /// not grow.
    pub fn try_push(&mut self, point: Point) -> Result<(), TraceError> {
        if self.0.len() == self.0.capacity() {
            let additional = self.0.capacity().max(4);
            self.0.try_reserve(additional)?;
        }
        self.0.push(point);
        Ok(())
    }

    /// Overwrite the last vertex with an exact copy of the first.
    pub(crate) fn close(&mut self) {
        if let Some(&first) = self.0.first()
            && let Some(last) = self.0.last_mut()
        {
            *last = first;
        }
    }

    /// Returns `true` if the path has at least two vertices and its first
    /// and last vertices are bit-for-bit identical.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.0.first(), self.0.last()) {
            (Some(a), Some(b)) if self.0.len() > 1 => a.bitwise_eq(*b),
            _ => false,
        }
    }

    /// Reverse the vertex order in place.
    pub fn reverse(&mut self) {
        self.0.reverse();
    }

    /// Cumulative plot-unit arc length at every vertex.
    ///
    /// Periodic wrap steps (see [`is_wrap_step`]) contribute zero length.
    #[must_use]
    pub fn arc_lengths(&self) -> Vec<f64> {
        let mut lengths = Vec::with_capacity(self.0.len());
        let mut total = 0.0;
        for (i, &p) in self.0.iter().enumerate() {
            if i > 0 {
                let prev = self.0[i - 1];
                if !is_wrap_step(prev, p) {
                    total += prev.distance(p);
                }
            }
            lengths.push(total);
        }
        lengths
    }

    /// Total plot-unit length of the path (wrap steps excluded).
    #[must_use]
    pub fn length(&self) -> f64 {
        self.arc_lengths().last().copied().unwrap_or(0.0)
    }
}

impl From<Vec<Point>> for Path {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

/// Which end of an open path a justified label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathEnd {
    /// Label pinned to the first vertex.
    Start,
    /// Label pinned to the last vertex.
    End,
}

/// A label placed on a contour line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// On-line anchor; spliced into the path as an explicit vertex.
    pub anchor: Point,
    /// Display position: the anchor after any nudge.
    pub position: Point,
    /// Plot-unit arc length from the path start to the anchor.
    pub distance: f64,
    /// Owning vertex index. Before splicing this is the start of the
    /// segment holding the anchor; after splicing it is the index of the
    /// inserted vertex.
    pub node: usize,
    /// Local tangent angle of the line in degrees.
    pub line_angle: f64,
    /// Display angle of the text in degrees.
    pub angle: f64,
    /// Label text.
    pub text: String,
    /// Text colour.
    pub color: Rgba,
    /// Set when the label was justified to one end of an open path.
    pub end: Option<PathEnd>,
}

/// Pen attributes of a finished contour line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    /// Line colour.
    pub color: Rgba,
    /// Line width in plot units.
    pub width: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: [0, 0, 0, 255],
            width: 1.0,
        }
    }
}

/// A finished contour line: the engine's unit of output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourLine {
    /// Path geometry, including any spliced label vertices.
    pub path: Path,
    /// Contour level this line was traced at.
    pub level: f64,
    /// Whether this level is annotated.
    pub annotated: bool,
    /// Whether the trace returned to its starting edge.
    pub closed: bool,
    /// Pen attributes.
    pub style: LineStyle,
    /// Labels, ordered by distance along the path.
    pub labels: Vec<Label>,
}

/// Errors that abort a single trace.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// A path buffer could not grow.
    #[error("failed to grow contour path: {0}")]
    Allocation(#[from] TryReserveError),

    /// An edge index fell outside the visitation set.
    #[error("edge index {index} out of bounds for {orientation:?} plane")]
    EdgeOutOfBounds {
        /// Which bit-plane was addressed.
        orientation: crate::edges::Orientation,
        /// The offending linear edge index.
        index: usize,
    },
}

/// Errors reported by the contouring engine.
#[derive(Debug, thiserror::Error)]
pub enum ContourError {
    /// The grid was rejected before tracing began.
    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),

    /// Contouring configuration is invalid.
    #[error("invalid contour configuration: {0}")]
    InvalidConfig(String),

    /// A trace failed.
    #[error("trace failed: {0}")]
    Trace(#[from] TraceError),
}
