//! Intersections between a contour and caller-supplied crossing lines.

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Coord, Line};

use crate::types::{Point, is_wrap_step};

/// One intersection between two polylines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Fractional vertex index on the first line: `2.25` is a quarter of
    /// the way from vertex 2 to vertex 3.
    pub index_a: f64,
    /// Fractional vertex index on the second line.
    pub index_b: f64,
    /// Where the lines meet.
    pub point: Point,
}

/// Finds where two polylines cross.
pub trait CrossingFinder {
    /// Every intersection of `a` with `b`, ordered along `a`. An empty
    /// result means the lines do not cross.
    fn crossings(&self, a: &[Point], b: &[Point]) -> Vec<Intersection>;
}

/// Brute-force segment-pair intersection using `geo`.
///
/// Collinear overlaps contribute their first shared point. Wrap steps
/// are not segments and never intersect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentCrossings;

impl CrossingFinder for SegmentCrossings {
    fn crossings(&self, a: &[Point], b: &[Point]) -> Vec<Intersection> {
        let mut found = Vec::new();
        for (i, sa) in a.windows(2).enumerate() {
            if is_wrap_step(sa[0], sa[1]) {
                continue;
            }
            let line_a = Line::new(coord(sa[0]), coord(sa[1]));
            for (j, sb) in b.windows(2).enumerate() {
                if is_wrap_step(sb[0], sb[1]) {
                    continue;
                }
                let line_b = Line::new(coord(sb[0]), coord(sb[1]));
                let hit = match line_intersection(line_a, line_b) {
                    Some(LineIntersection::SinglePoint { intersection, .. }) => intersection,
                    Some(LineIntersection::Collinear { intersection }) => intersection.start,
                    None => continue,
                };
                let point = Point::new(hit.x, hit.y);
                let ia = fraction_along(sa[0], sa[1], point);
                let ib = fraction_along(sb[0], sb[1], point);
                // A crossing exactly on a shared vertex shows up on both
                // neighbouring segments; keep it once.
                #[allow(clippy::cast_precision_loss)]
                let candidate = Intersection {
                    index_a: i as f64 + ia,
                    index_b: j as f64 + ib,
                    point,
                };
                let duplicate = found.iter().any(|f: &Intersection| {
                    (f.index_a - candidate.index_a).abs() < 1e-9
                        && (f.index_b - candidate.index_b).abs() < 1e-9
                });
                if !duplicate {
                    found.push(candidate);
                }
            }
        }
        found.sort_by(|x, y| x.index_a.total_cmp(&y.index_a));
        found
    }
}

const fn coord(p: Point) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Fraction of the way from `a` to `b` at which `p` lies.
fn fraction_along(a: Point, b: Point, p: Point) -> f64 {
    let len2 = a.distance_squared(b);
    if len2 <= 0.0 {
        return 0.0;
    }
    let t = (p.x - a.x).mul_add(b.x - a.x, (p.y - a.y) * (b.y - a.y)) / len2;
    t.clamp(0.0, 1.0)
}
