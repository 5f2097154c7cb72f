//! Label placement along finished contour lines.
//!
//! [`LabelPlanner::plan`] turns one path into a list of [`Label`]s:
//!
//! 1. Measure the path ([`PathDistances`]): plot distance, track
//!    distance (tight bends removed), and metric distance for text.
//! 2. Generate candidate anchors under the active [`PlacementPolicy`].
//! 3. Drop candidates too close to a label already placed on this line
//!    or on any finished line ([`LabelIndex`]).
//! 4. Ask the [`LabelSource`] for text; `None` drops the candidate.
//! 5. Fit the local tangent, derive the display angle, and apply the
//!    [`Nudge`].
//!
//! Labels come back ordered by distance along the path, each owning the
//! vertex that starts the segment holding its anchor, ready for
//! [`insert_labels`](crate::splice::insert_labels).

pub mod angle;
pub mod crossing;
pub mod distance;
pub mod policy;
pub mod text;

pub use angle::{AngleMode, HalfWidth, Nudge, TangentWindow, display_angle, fold_upright, tangent_angle};
pub use crossing::{CrossingFinder, Intersection, SegmentCrossings};
pub use distance::{DistanceMetric, PathDistances};
pub use policy::{FixedPoint, Justify, PlacementPolicy};
pub use text::{LabelContext, LabelFormatter, LabelSource, TextKind};

use crate::collect::LabelIndex;
use crate::config::LabelConfig;
use crate::types::{Label, Path, PathEnd, Point, Rgba};

/// Per-line facts the planner cannot derive from the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineContext<'a> {
    /// Contour level.
    pub level: f64,
    /// Index of the line among those of its level.
    pub line_index: usize,
    /// Header text, if the caller has one.
    pub header: Option<&'a str>,
    /// Label text colour.
    pub color: Rgba,
}

/// Result of planning one line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelPlan {
    /// Accepted labels, ordered along the path.
    pub labels: Vec<Label>,
    /// Candidates dropped for being too close to another label.
    pub rejected_isolation: usize,
    /// Candidates dropped because the text source declined.
    pub rejected_text: usize,
}

/// A label location before filtering.
#[derive(Debug, Clone, Copy)]
struct Candidate<'p> {
    anchor: Point,
    /// Vertex starting the segment that holds the anchor.
    node: usize,
    /// Vertex range the tangent window is centred on.
    start: usize,
    stop: usize,
    map: f64,
    value: f64,
    end: Option<PathEnd>,
    point_text: Option<&'p str>,
}

/// Plans labels for one line at a time.
pub struct LabelPlanner<'a> {
    config: &'a LabelConfig,
    source: &'a dyn LabelSource,
    finder: &'a dyn CrossingFinder,
}

impl<'a> LabelPlanner<'a> {
    /// A planner using the given text source and crossing finder.
    #[must_use]
    pub fn new(
        config: &'a LabelConfig,
        source: &'a dyn LabelSource,
        finder: &'a dyn CrossingFinder,
    ) -> Self {
        Self {
            config,
            source,
            finder,
        }
    }

    /// Plan labels along `path`, keeping clear of anchors in `existing`.
    #[must_use]
    pub fn plan(&self, path: &Path, line: &LineContext<'_>, existing: &LabelIndex) -> LabelPlan {
        let points = path.points();
        let mut plan = LabelPlan::default();
        if points.len() < 2 {
            return plan;
        }
        let config = self.config;
        let distances = PathDistances::new(path, config.curvature_floor, config.distance_metric);
        let closed = path.is_closed();

        let mut candidates = match &config.policy {
            PlacementPolicy::Spacing {
                interval,
                initial_offset,
            } => spacing(points, &distances, closed, *interval, *initial_offset),
            PlacementPolicy::Count {
                n,
                min_separation,
                justify,
            } => count(points, &distances, closed, *n, *min_separation, *justify),
            PlacementPolicy::Crossing { lines } => lines
                .iter()
                .flat_map(|l| crossing(points, &distances, self.finder, l))
                .collect(),
            PlacementPolicy::Fixed {
                points: fixed,
                tolerance,
            } => nearest_vertices(points, &distances, fixed, *tolerance),
        };
        candidates.sort_by(|a, b| a.map.total_cmp(&b.map));

        let window = TangentWindow {
            half_width: config.half_width.resolve(points.len()),
            directed: config.directed,
        };
        for c in candidates {
            let crowded = plan
                .labels
                .iter()
                .any(|l| l.anchor.distance(c.anchor) < config.isolation)
                || existing.any_within(c.anchor, config.isolation);
            if crowded {
                plan.rejected_isolation += 1;
                continue;
            }

            let context = LabelContext {
                kind: &config.text,
                level: line.level,
                line_index: line.line_index,
                header: line.header,
                plot_distance: c.map,
                value_distance: c.value,
                point_text: c.point_text,
            };
            let Some(text) = self.source.text(&context) else {
                plan.rejected_text += 1;
                continue;
            };

            let line_angle = tangent_angle(points, c.anchor, c.start, c.stop, window);
            plan.labels.push(Label {
                anchor: c.anchor,
                position: config.nudge.apply(c.anchor, line_angle, c.end),
                distance: c.map,
                node: c.node,
                line_angle,
                angle: display_angle(config.angle, line_angle, config.fold_angle),
                text,
                color: line.color,
                end: c.end,
            });
        }
        tracing::trace!(
            level = line.level,
            placed = plan.labels.len(),
            rejected_isolation = plan.rejected_isolation,
            rejected_text = plan.rejected_text,
            "planned labels"
        );
        plan
    }
}

/// Point at fraction `1 - back` from `points[i - 1]` to `points[i]`,
/// interpolating from whichever end is nearer.
fn between(points: &[Point], i: usize, back: f64) -> Point {
    if back < 0.5 {
        points[i].lerp(points[i - 1], back)
    } else {
        points[i - 1].lerp(points[i], 1.0 - back)
    }
}

/// A candidate `back` of the way back from vertex `i` towards `i - 1`.
fn candidate_before<'p>(
    points: &[Point],
    distances: &PathDistances,
    i: usize,
    back: f64,
    end: Option<PathEnd>,
) -> Candidate<'p> {
    let (map, value) = distances.at(i - 1, 1.0 - back);
    Candidate {
        anchor: between(points, i, back),
        node: i - 1,
        start: i - 1,
        stop: i,
        map,
        value,
        end,
        point_text: None,
    }
}

/// One label every `interval` of track distance.
fn spacing<'p>(
    points: &[Point],
    distances: &PathDistances,
    closed: bool,
    interval: f64,
    initial_offset: f64,
) -> Vec<Candidate<'p>> {
    let track = &distances.track;
    let mut found = Vec::new();
    if !(interval > 0.0) {
        return found;
    }
    let mut offset = if closed {
        (1.0 - initial_offset) * interval
    } else {
        0.0
    };
    let mut last = 0.0;
    let mut i = 1;
    while i < points.len() {
        let dist = track[i] + offset - last;
        let step = track[i] - track[i - 1];
        if dist > interval && step > 0.0 {
            let back = ((dist - interval) / step).clamp(0.0, 1.0);
            found.push(candidate_before(points, distances, i, back, None));
            last += interval - offset;
            offset = 0.0;
        } else {
            i += 1;
        }
    }
    found
}

/// Track distances, and end flags, of `n` counted labels.
#[allow(clippy::cast_precision_loss)]
fn count_positions(total: f64, closed: bool, n: usize, justify: Justify) -> Vec<(f64, Option<PathEnd>)> {
    let nf = n as f64;
    if closed {
        return (1..=n).map(|i| (i as f64 * total / nf, None)).collect();
    }
    match (justify, n) {
        (Justify::Spread, _) => (1..=n).map(|i| (i as f64 * total / (nf + 1.0), None)).collect(),
        (Justify::Start, 1) => vec![(0.0, Some(PathEnd::Start))],
        (Justify::End, 1) => vec![(total, Some(PathEnd::End))],
        (_, 1) => vec![(0.5 * total, None)],
        _ => (0..n)
            .map(|i| {
                let end = match i {
                    0 => Some(PathEnd::Start),
                    _ if i + 1 == n => Some(PathEnd::End),
                    _ => None,
                };
                (i as f64 * total / (nf - 1.0), end)
            })
            .collect(),
    }
}

/// A fixed number of labels at equal fractions of the track length.
fn count<'p>(
    points: &[Point],
    distances: &PathDistances,
    closed: bool,
    n: usize,
    min_separation: f64,
    justify: Justify,
) -> Vec<Candidate<'p>> {
    let track = &distances.track;
    let total = distances.track_length();
    let mut found: Vec<Candidate<'p>> = Vec::new();
    if n == 0 || !(total > 0.0) {
        return found;
    }
    let last_vertex = points.len() - 1;
    for (dist, end) in count_positions(total, closed, n, justify) {
        let j = track.partition_point(|&t| t < dist).min(last_vertex);
        let candidate = if j == 0 {
            Candidate {
                anchor: points[0],
                node: 0,
                start: 0,
                stop: 0,
                map: 0.0,
                value: 0.0,
                end,
                point_text: None,
            }
        } else {
            let step = track[j] - track[j - 1];
            let back = if step > 0.0 {
                ((track[j] - dist) / step).clamp(0.0, 1.0)
            } else {
                0.0
            };
            candidate_before(points, distances, j, back, end)
        };
        if let Some(prev) = found.last()
            && candidate.map - prev.map < min_separation
        {
            continue;
        }
        found.push(candidate);
    }
    found
}

/// A label at every crossing with `line`.
fn crossing<'p>(
    points: &[Point],
    distances: &PathDistances,
    finder: &dyn CrossingFinder,
    line: &Path,
) -> Vec<Candidate<'p>> {
    let last_segment = points.len() - 2;
    finder
        .crossings(points, line.points())
        .into_iter()
        .filter(|hit| hit.index_a.is_finite() && hit.index_a >= 0.0)
        .map(|hit| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let node = (hit.index_a.floor() as usize).min(last_segment);
            #[allow(clippy::cast_precision_loss)]
            let frac = (hit.index_a - node as f64).clamp(0.0, 1.0);
            let (map, value) = distances.at(node, frac);
            Candidate {
                anchor: hit.point,
                node,
                start: node,
                stop: node + 1,
                map,
                value,
                end: None,
                point_text: None,
            }
        })
        .collect()
}

/// A label at the vertex nearest each fixed point, within `tolerance`.
fn nearest_vertices<'p>(
    points: &[Point],
    distances: &PathDistances,
    fixed: &'p [FixedPoint],
    tolerance: f64,
) -> Vec<Candidate<'p>> {
    let last_segment = points.len() - 2;
    fixed
        .iter()
        .filter_map(|fp| {
            let (idx, d2) = points
                .iter()
                .map(|p| p.distance_squared(fp.point))
                .enumerate()
                .fold(None, |best: Option<(usize, f64)>, (i, d2)| match best {
                    Some((_, b)) if b <= d2 => best,
                    _ => Some((i, d2)),
                })?;
            (d2.sqrt() < tolerance).then(|| Candidate {
                anchor: points[idx],
                node: idx.min(last_segment),
                start: idx,
                stop: idx,
                map: distances.map[idx],
                value: distances.value[idx],
                end: None,
                point_text: fp.text.as_deref(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn config(policy: PlacementPolicy) -> LabelConfig {
        LabelConfig {
            policy,
            ..LabelConfig::default()
        }
    }

    fn context() -> LineContext<'static> {
        LineContext {
            level: 10.0,
            line_index: 0,
            header: None,
            color: [0, 0, 0, 255],
        }
    }

    fn plan(config: &LabelConfig, path: &Path) -> LabelPlan {
        let formatter = LabelFormatter::default();
        LabelPlanner::new(config, &formatter, &SegmentCrossings).plan(
            path,
            &context(),
            &LabelIndex::new(),
        )
    }

    fn straight(length: f64) -> Path {
        Path::new(vec![Point::new(0.0, 0.0), Point::new(length, 0.0)])
    }

    fn square(side: f64) -> Path {
        Path::new(vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
            Point::new(0.0, 0.0),
        ])
    }

    #[test]
    fn spacing_on_straight_line() {
        let cfg = config(PlacementPolicy::Spacing {
            interval: 3.0,
            initial_offset: 0.0,
        });
        let labels = plan(&cfg, &straight(10.0)).labels;
        let dists: Vec<f64> = labels.iter().map(|l| l.distance).collect();
        assert_eq!(dists.len(), 3);
        for (got, want) in dists.iter().zip([3.0, 6.0, 9.0]) {
            assert!(close(*got, want), "{got} != {want}");
        }
        assert!(labels.iter().all(|l| l.node == 0 && l.text == "10"));
    }

    #[test]
    fn spacing_offset_applies_to_closed_lines_only() {
        let cfg = config(PlacementPolicy::Spacing {
            interval: 4.0,
            initial_offset: 0.5,
        });
        let closed = plan(&cfg, &square(4.0)).labels;
        assert!(close(closed[0].distance, 2.0));
        let open = plan(&cfg, &straight(10.0)).labels;
        assert!(close(open[0].distance, 4.0));
    }

    #[test]
    fn count_on_closed_square_ends_at_closure() {
        let cfg = config(PlacementPolicy::Count {
            n: 4,
            min_separation: 0.0,
            justify: Justify::Spread,
        });
        let path = square(2.0);
        let labels = plan(&cfg, &path).labels;
        let dists: Vec<f64> = labels.iter().map(|l| l.distance).collect();
        assert_eq!(dists.len(), 4);
        for (got, want) in dists.iter().zip([2.0, 4.0, 6.0, 8.0]) {
            assert!(close(*got, want), "{got} != {want}");
        }
        assert_eq!(labels[3].anchor, Point::new(0.0, 0.0));
        assert!(labels.iter().all(|l| l.node <= path.len() - 2));
    }

    #[test]
    fn count_spread_on_open_line() {
        let cfg = config(PlacementPolicy::Count {
            n: 3,
            min_separation: 0.0,
            justify: Justify::Spread,
        });
        let labels = plan(&cfg, &straight(8.0)).labels;
        let xs: Vec<f64> = labels.iter().map(|l| l.anchor.x).collect();
        assert_eq!(xs.len(), 3);
        assert!(close(xs[0], 2.0) && close(xs[1], 4.0) && close(xs[2], 6.0));
    }

    #[test]
    fn count_min_separation_drops_crowded_labels() {
        let cfg = config(PlacementPolicy::Count {
            n: 4,
            min_separation: 3.0,
            justify: Justify::Spread,
        });
        // Labels would fall every 2 units; every other one is dropped.
        let labels = plan(&cfg, &straight(10.0)).labels;
        assert_eq!(labels.len(), 2);
        assert!(close(labels[0].distance, 2.0));
        assert!(close(labels[1].distance, 6.0));
    }

    #[test]
    fn single_label_justified_to_end() {
        let mut cfg = config(PlacementPolicy::Count {
            n: 1,
            min_separation: 0.0,
            justify: Justify::End,
        });
        cfg.nudge = Nudge::AlongLine {
            along: 1.0,
            across: 0.0,
        };
        let labels = plan(&cfg, &straight(10.0)).labels;
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].end, Some(PathEnd::End));
        assert_eq!(labels[0].anchor, Point::new(10.0, 0.0));
        assert!(close(labels[0].position.x, 9.0));

        cfg.policy = PlacementPolicy::Count {
            n: 1,
            min_separation: 0.0,
            justify: Justify::Start,
        };
        let labels = plan(&cfg, &straight(10.0)).labels;
        assert_eq!(labels[0].end, Some(PathEnd::Start));
        assert!(close(labels[0].position.x, 1.0));
    }

    #[test]
    fn isolation_rejects_close_labels() {
        let mut cfg = config(PlacementPolicy::Spacing {
            interval: 1.0,
            initial_offset: 0.0,
        });
        cfg.isolation = 2.5;
        let p = plan(&cfg, &straight(10.0));
        for pair in p.labels.windows(2) {
            assert!(pair[0].anchor.distance(pair[1].anchor) >= 2.5);
        }
        assert!(p.rejected_isolation > 0);
        assert_eq!(p.labels.len() + p.rejected_isolation, 9);
    }

    #[test]
    fn isolation_checks_finished_lines() {
        let mut cfg = config(PlacementPolicy::Spacing {
            interval: 5.0,
            initial_offset: 0.0,
        });
        cfg.isolation = 1.0;
        let mut index = LabelIndex::new();
        index.insert(Point::new(5.0, 0.5));
        let formatter = LabelFormatter::default();
        let p = LabelPlanner::new(&cfg, &formatter, &SegmentCrossings).plan(
            &straight(12.0),
            &context(),
            &index,
        );
        assert_eq!(p.labels.len(), 1);
        assert!(close(p.labels[0].distance, 10.0));
        assert_eq!(p.rejected_isolation, 1);
    }

    #[test]
    fn crossing_policy_labels_intersections() {
        let cfg = config(PlacementPolicy::Crossing {
            lines: vec![
                Path::new(vec![Point::new(7.5, -1.0), Point::new(7.5, 1.0)]),
                Path::new(vec![Point::new(2.5, -1.0), Point::new(2.5, 1.0)]),
            ],
        });
        let path = Path::new(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
        ]);
        let labels = plan(&cfg, &path).labels;
        assert_eq!(labels.len(), 2);
        assert!(close(labels[0].anchor.x, 2.5) && close(labels[0].anchor.y, 0.0));
        assert_eq!(labels[0].node, 0);
        assert_eq!(labels[1].node, 1);
        assert!(close(labels[1].distance, 7.5));
    }

    #[test]
    fn fixed_policy_snaps_to_nearest_vertex() {
        let mut cfg = config(PlacementPolicy::Fixed {
            points: vec![
                FixedPoint {
                    point: Point::new(4.9, 0.2),
                    text: Some("B".to_string()),
                },
                FixedPoint::new(50.0, 50.0),
            ],
            tolerance: 1.0,
        });
        cfg.text = TextKind::PointText;
        let path = Path::new(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
        ]);
        let labels = plan(&cfg, &path).labels;
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].anchor, Point::new(5.0, 0.0));
        assert_eq!(labels[0].text, "B");
        assert_eq!(labels[0].node, 1);
    }

    #[test]
    fn declined_text_drops_candidate() {
        let mut cfg = config(PlacementPolicy::Spacing {
            interval: 3.0,
            initial_offset: 0.0,
        });
        cfg.text = TextKind::Header;
        let p = plan(&cfg, &straight(10.0));
        assert!(p.labels.is_empty());
        assert_eq!(p.rejected_text, 3);
    }

    #[test]
    fn tight_bends_delay_spacing_labels() {
        let mut cfg = config(PlacementPolicy::Spacing {
            interval: 1.0,
            initial_offset: 0.0,
        });
        cfg.curvature_floor = 1.5;
        // A sharp spike at x = 1: the step into it does not count.
        let path = Path::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
            Point::new(5.0, 0.0),
        ]);
        let labels = plan(&cfg, &path).labels;
        assert!(labels.iter().all(|l| l.node >= 1));
    }

    #[test]
    fn labels_on_a_vertical_line_are_upright() {
        let cfg = config(PlacementPolicy::Spacing {
            interval: 2.0,
            initial_offset: 0.0,
        });
        let path = Path::new(vec![Point::new(0.0, 5.0), Point::new(0.0, 0.0)]);
        let labels = plan(&cfg, &path).labels;
        assert!(!labels.is_empty());
        assert!(labels.iter().all(|l| close(l.angle, 90.0)));
    }
}
