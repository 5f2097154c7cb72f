//! Label orientation and display offsets.

use serde::{Deserialize, Serialize};

use crate::types::{PathEnd, Point};

/// Sums of squares at or below this fraction of the path's squared
/// extent are treated as zero.
const FLAT: f64 = 1e-8;

/// How the display angle of a label relates to the line.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AngleMode {
    /// Along the local tangent.
    #[default]
    LineParallel,
    /// Across the line (tangent plus 90 degrees).
    LineNormal,
    /// A fixed angle in degrees; NaN falls back to the tangent.
    Fixed(f64),
}

/// Half-width, in vertices, of the window used to fit the tangent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HalfWidth {
    /// A tenth of the path's vertex count, at least one.
    #[default]
    Auto,
    /// This many vertices on each side.
    Fixed(usize),
}

impl HalfWidth {
    /// Resolve against a path of `n` vertices.
    #[must_use]
    pub fn resolve(self, n: usize) -> usize {
        match self {
            Self::Auto => (n / 10).max(1),
            Self::Fixed(w) => w,
        }
    }
}

/// Offset from a label's on-line anchor to where its text is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Nudge {
    /// Draw at the anchor.
    #[default]
    None,
    /// A fixed plot-unit offset.
    Absolute {
        /// Offset in x.
        dx: f64,
        /// Offset in y.
        dy: f64,
    },
    /// An offset in the line's own frame.
    AlongLine {
        /// Along the tangent, towards the path end. Reversed for labels
        /// justified to the end of the path so they move inward.
        along: f64,
        /// Along the left-hand normal.
        across: f64,
    },
}

impl Nudge {
    /// Displace `anchor` for a label with tangent `line_angle` degrees.
    #[must_use]
    pub fn apply(self, anchor: Point, line_angle: f64, end: Option<PathEnd>) -> Point {
        match self {
            Self::None => anchor,
            Self::Absolute { dx, dy } => Point::new(anchor.x + dx, anchor.y + dy),
            Self::AlongLine { along, across } => {
                let along = if end == Some(PathEnd::End) { -along } else { along };
                let (sin, cos) = line_angle.to_radians().sin_cos();
                Point::new(
                    along.mul_add(cos, -across * sin) + anchor.x,
                    along.mul_add(sin, across * cos) + anchor.y,
                )
            }
        }
    }
}

/// Settings for [`tangent_angle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TangentWindow {
    /// Vertices on each side of the anchor's segment.
    pub half_width: usize,
    /// Flip by 180 degrees when the tangent opposes the path direction.
    pub directed: bool,
}

/// Local line direction at `anchor`, in degrees.
///
/// A least-squares line through the anchor is fitted to the vertices
/// `start - half_width ..= stop + half_width`, where `start..=stop` is the
/// segment (or vertex) holding the anchor. Undirected angles lie in
/// `[-90, 90]`; with `directed` set the angle points along the path.
#[must_use]
pub fn tangent_angle(
    points: &[Point],
    anchor: Point,
    start: usize,
    stop: usize,
    window: TangentWindow,
) -> f64 {
    let n = points.len();
    if n == 0 {
        return 0.0;
    }
    let (mut start, mut stop) = (start.min(n - 1), stop.min(n - 1));
    if start == stop {
        if start > 0 {
            start -= 1;
        } else if stop + 1 < n {
            stop += 1;
        }
    }
    let lo = start.saturating_sub(window.half_width);
    let hi = (stop + window.half_width).min(n - 1);

    let (mut sum_x2, mut sum_y2, mut sum_xy) = (0.0, 0.0, 0.0);
    for p in &points[lo..=hi] {
        let dx = p.x - anchor.x;
        let dy = p.y - anchor.y;
        sum_x2 += dx * dx;
        sum_y2 += dy * dy;
        sum_xy += dx * dy;
    }
    let flat = FLAT * squared_extent(points);
    let mut angle = if sum_x2 <= flat {
        90.0
    } else if sum_y2 <= flat {
        0.0
    } else {
        sum_xy.atan2(sum_x2).to_degrees()
    };

    if window.directed {
        let net_x = points[hi].x - points[lo].x;
        let net_y = points[hi].y - points[lo].y;
        let (sin, cos) = angle.to_radians().sin_cos();
        if net_x.mul_add(cos, net_y * sin) < 0.0 {
            angle += 180.0;
        }
    }
    angle
}

/// Squared diagonal of the bounding box of `points`.
fn squared_extent(points: &[Point]) -> f64 {
    let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
    let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }
    let (w, h) = (x1 - x0, y1 - y0);
    w.mul_add(w, h * h)
}

/// Fold an angle into `(-90, 90]` so text never reads upside down.
#[must_use]
pub fn fold_upright(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    if a > 90.0 {
        a - 180.0
    } else if a <= -90.0 {
        a + 180.0
    } else {
        a
    }
}

/// Display angle for a label whose line runs at `line_angle`.
#[must_use]
pub fn display_angle(mode: AngleMode, line_angle: f64, fold: bool) -> f64 {
    let angle = match mode {
        AngleMode::LineParallel => line_angle,
        AngleMode::LineNormal => line_angle + 90.0,
        AngleMode::Fixed(a) if a.is_nan() => line_angle,
        AngleMode::Fixed(a) => a,
    };
    if fold { fold_upright(angle) } else { angle }
}
