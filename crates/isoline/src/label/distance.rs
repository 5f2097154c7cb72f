//! Per-vertex distance arrays along a path.

use geo::Haversine;
use geo::line_measures::Distance;
use serde::{Deserialize, Serialize};

use crate::types::{Path, Point, is_wrap_step};

/// How the "value" distance used for distance label text is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Plot units.
    #[default]
    Cartesian,
    /// Great-circle kilometres, treating `x` as longitude and `y` as
    /// latitude in degrees.
    Geographic,
}

impl DistanceMetric {
    /// Length of the step `a -> b` under this metric.
    #[must_use]
    pub fn step(self, a: Point, b: Point) -> f64 {
        match self {
            Self::Cartesian => a.distance(b),
            Self::Geographic => {
                Haversine.distance(geo::Point::new(a.x, a.y), geo::Point::new(b.x, b.y)) / 1000.0
            }
        }
    }
}

/// Parallel cumulative distances at every vertex of a path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathDistances {
    /// Plot-unit arc length.
    pub map: Vec<f64>,
    /// Arc length with steps onto tight bends removed; drives the
    /// spacing and count policies.
    pub track: Vec<f64>,
    /// Arc length under the configured [`DistanceMetric`].
    pub value: Vec<f64>,
    /// Radius of curvature at each vertex; infinite at the ends and on
    /// straight runs.
    pub radius: Vec<f64>,
}

impl PathDistances {
    /// Measure `path`. Steps into a vertex whose radius of curvature is
    /// below `curvature_floor` add nothing to the track distance. Wrap
    /// steps add nothing to any distance.
    #[must_use]
    pub fn new(path: &Path, curvature_floor: f64, metric: DistanceMetric) -> Self {
        let points = path.points();
        let map = path.arc_lengths();
        let radius = curvature_radii(points);

        let mut track = Vec::with_capacity(points.len());
        let mut value = Vec::with_capacity(points.len());
        let (mut t, mut v) = (0.0, 0.0);
        for (i, &p) in points.iter().enumerate() {
            if i > 0 {
                let prev = points[i - 1];
                if !is_wrap_step(prev, p) {
                    if radius[i] >= curvature_floor {
                        t += map[i] - map[i - 1];
                    }
                    v += metric.step(prev, p);
                }
            }
            track.push(t);
            value.push(v);
        }
        Self {
            map,
            track,
            value,
            radius,
        }
    }

    /// Total track length.
    #[must_use]
    pub fn track_length(&self) -> f64 {
        self.track.last().copied().unwrap_or(0.0)
    }

    /// Interpolated map and value distance at fraction `f` of the step
    /// from vertex `node` to `node + 1`.
    #[must_use]
    pub fn at(&self, node: usize, f: f64) -> (f64, f64) {
        let next = (node + 1).min(self.map.len().saturating_sub(1));
        let lerp = |d: &[f64]| f.mul_add(d[next] - d[node], d[node]);
        (lerp(&self.map), lerp(&self.value))
    }
}

/// Radius of the circle through each interior vertex and its neighbours.
fn curvature_radii(points: &[Point]) -> Vec<f64> {
    let mut radius = vec![f64::INFINITY; points.len()];
    for i in 1..points.len().saturating_sub(1) {
        let (a, b, c) = (points[i - 1], points[i], points[i + 1]);
        if is_wrap_step(a, b) || is_wrap_step(b, c) {
            continue;
        }
        let cross = (b.x - a.x).mul_add(c.y - a.y, -(b.y - a.y) * (c.x - a.x));
        if cross.abs() > f64::EPSILON {
            radius[i] = a.distance(b) * b.distance(c) * c.distance(a) / (2.0 * cross.abs());
        }
    }
    radius
}
