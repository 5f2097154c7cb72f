//! Integration tests: contour properties checked end to end through the
//! public API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::f64::consts::TAU;

use isoline::label::{Justify, LabelFormatter, SegmentCrossings};
use isoline::orient::handedness;
use isoline::{
    CellSide, ContourConfig, ContourLevel, ContourTracer, EdgeVisitationSet, Grid, GridHeader,
    Kernel, LabelConfig, LabelIndex, LabelPlanner, LevelSet, LevelSweep, LineContext, Path,
    PlacementPolicy, Point, ScalarField, Side, SmoothingConfig, insert_labels, smooth,
};

fn hills() -> Grid {
    Grid::from_fn(GridHeader::new(0.0, TAU, 0.0, TAU), 31, 31, |x, y| {
        x.sin() * y.cos()
    })
    .unwrap()
}

fn bump() -> Grid {
    Grid::from_fn(GridHeader::new(-2.0, 2.0, -2.0, 2.0), 25, 25, |x, y| {
        9.0 * (-(x * x + y * y)).exp()
    })
    .unwrap()
}

/// Longitude bands: maxima at 0 and +/-120, minima at +/-60 and 180.
fn globe() -> Grid {
    let header = GridHeader::new(-180.0, 180.0, -80.0, 80.0).periodic();
    Grid::from_fn(header, 37, 17, |x, y| {
        (3.0 * x).to_radians().cos() * y.to_radians().cos()
    })
    .unwrap()
}

fn explicit(values: &[f64], annotate: bool) -> LevelSet {
    LevelSet::Explicit(
        values
            .iter()
            .map(|&value| ContourLevel { value, annotate })
            .collect(),
    )
}

fn traced(grid: &Grid, level: f64) -> Vec<Path> {
    LevelSweep::new(grid, level)
        .map(|r| r.unwrap().path)
        .collect()
}

#[test]
fn closed_lines_are_exactly_closed() {
    let config = ContourConfig {
        levels: explicit(&[1.0, 3.0, 5.0, 7.0], true),
        smoothing: SmoothingConfig {
            factor: 4,
            kernel: Kernel::Akima,
        },
        ..ContourConfig::default()
    };
    let set = isoline::contour(&bump(), &config).unwrap();
    assert_eq!(set.lines.len(), 4);
    for line in &set.lines {
        assert!(line.closed);
        let first = line.path.first().unwrap();
        let last = line.path.last().unwrap();
        assert_eq!(first.x.to_bits(), last.x.to_bits());
        assert_eq!(first.y.to_bits(), last.y.to_bits());
    }
}

#[test]
fn every_edge_is_traced_once() {
    let mut data = hills().data().to_vec();
    for i in [100, 101, 131, 400, 401, 700] {
        data[i] = f64::NAN;
    }
    let grid = Grid::new(*hills().header(), 31, 31, data).unwrap();
    for level in [-0.6, -0.2, 0.1, 0.5] {
        let mut sweep = LevelSweep::new(&grid, level);
        let crossings: usize = sweep.by_ref().map(|r| r.unwrap().crossings).sum();
        assert_eq!(crossings, sweep.edges().count_set(), "level {level}");
        assert!(crossings > 0);
    }
}

#[test]
fn vertices_lie_on_cell_edges_at_the_level() {
    let grid = hills();
    let level = 0.3;
    let paths = traced(&grid, level);
    assert!(!paths.is_empty());
    let last_col = grid.n_cols() - 2;
    let last_row = grid.n_rows() - 2;
    for p in paths.iter().flat_map(|p| p.points()) {
        let (c, r) = grid.to_grid(*p);
        let value = if (c - c.round()).abs() < 1e-9 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (col, r0) = (c.round() as usize, (r.floor() as usize).min(last_row));
            #[allow(clippy::cast_precision_loss)]
            let t = r - r0 as f64;
            assert!((0.0..=1.0).contains(&t));
            t.mul_add(grid.value(col, r0 + 1) - grid.value(col, r0), grid.value(col, r0))
        } else {
            assert!((r - r.round()).abs() < 1e-9, "vertex {p:?} is off every edge");
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (c0, row) = ((c.floor() as usize).min(last_col), r.round() as usize);
            #[allow(clippy::cast_precision_loss)]
            let t = c - c0 as f64;
            assert!((0.0..=1.0).contains(&t));
            t.mul_add(grid.value(c0 + 1, row) - grid.value(c0, row), grid.value(c0, row))
        };
        assert!((value - level).abs() < 1e-9, "{value} at {p:?}");
    }
}

#[test]
fn accepted_labels_keep_their_distance() {
    let mut config = ContourConfig {
        levels: LevelSet::Interval {
            interval: 0.25,
            annotation_interval: 0.25,
        },
        ..ContourConfig::default()
    };
    config.labels.policy = PlacementPolicy::Spacing {
        interval: 0.5,
        initial_offset: 0.0,
    };
    config.labels.isolation = 1.0;
    let set = isoline::contour(&hills(), &config).unwrap();
    let anchors: Vec<Point> = set
        .lines
        .iter()
        .flat_map(|l| l.labels.iter().map(|lb| lb.anchor))
        .collect();
    assert!(anchors.len() > 4);
    for (i, a) in anchors.iter().enumerate() {
        for b in &anchors[i + 1..] {
            assert!(a.distance(*b) >= 1.0, "{a:?} and {b:?}");
        }
    }
}

#[test]
fn splicing_adds_one_vertex_per_label_in_order() {
    let grid = bump();
    let path = traced(&grid, 4.0).remove(0);
    let config = LabelConfig {
        policy: PlacementPolicy::Spacing {
            interval: 0.7,
            initial_offset: 0.5,
        },
        ..LabelConfig::default()
    };
    let formatter = LabelFormatter::default();
    let planner = LabelPlanner::new(&config, &formatter, &SegmentCrossings);
    let line = LineContext {
        level: 4.0,
        line_index: 0,
        header: None,
        color: [0, 0, 0, 255],
    };
    let mut labels = planner.plan(&path, &line, &LabelIndex::new()).labels;
    assert!(labels.len() >= 3);

    let before = path.len();
    let spliced = insert_labels(path, &mut labels);
    assert_eq!(spliced.len(), before + labels.len());
    assert!(spliced.is_closed());

    let arc = spliced.arc_lengths();
    let at: Vec<f64> = labels.iter().map(|l| arc[l.node]).collect();
    assert!(at.windows(2).all(|w| w[0] <= w[1]));
    for label in &labels {
        assert_eq!(spliced.points()[label.node], label.anchor);
        assert!((arc[label.node] - label.distance).abs() < 1e-9);
    }
}

#[test]
fn disabled_smoothing_keeps_point_count() {
    let path = traced(&bump(), 3.0).remove(0);
    assert_eq!(smooth(path.clone(), 0, Kernel::Akima).len(), path.len());
    assert_eq!(smooth(path.clone(), 5, Kernel::None).len(), path.len());
    assert!(smooth(path.clone(), 3, Kernel::Cubic).len() > path.len());
}

#[test]
fn dateline_steps_are_exact() {
    let config = ContourConfig {
        levels: explicit(&[-0.45, 0.45], true),
        smoothing: SmoothingConfig {
            factor: 3,
            kernel: Kernel::Akima,
        },
        ..ContourConfig::default()
    };
    let set = isoline::contour(&globe(), &config).unwrap();
    let wraps: usize = set
        .diagnostics
        .levels
        .iter()
        .map(|l| l.dateline_crossings)
        .sum();
    assert!(wraps > 0);
    for line in &set.lines {
        for w in line.path.points().windows(2) {
            let dx = w[1].x - w[0].x;
            if dx.abs() > 180.0 {
                assert!((dx.abs() - 360.0).abs() < f64::EPSILON, "{w:?}");
                assert_eq!(w[0].y.to_bits(), w[1].y.to_bits(), "{w:?}");
            }
        }
    }
}

#[test]
fn single_cell_corner_cut() {
    let header = GridHeader::new(0.0, 1.0, 0.0, 1.0);
    // NW = 0, NE = 1, SW = 1, SE = 2.
    let grid = Grid::new(header, 2, 2, vec![0.0, 1.0, 1.0, 2.0]).unwrap();
    for (level, a, b) in [
        (1.25, Point::new(0.25, 0.0), Point::new(1.0, 0.75)),
        (1.5, Point::new(0.5, 0.0), Point::new(1.0, 0.5)),
        (0.5, Point::new(0.0, 0.5), Point::new(0.5, 1.0)),
    ] {
        let paths = traced(&grid, level);
        assert_eq!(paths.len(), 1, "level {level}");
        let pts = paths[0].points();
        assert_eq!(pts.len(), 2);
        let ends = [pts[0], pts[1]];
        for want in [a, b] {
            assert!(
                ends.iter().any(|p| p.distance(want) < 1e-12),
                "level {level}: {ends:?} misses {want:?}"
            );
        }
    }
}

#[test]
fn spacing_on_a_straight_line() {
    let config = LabelConfig {
        policy: PlacementPolicy::Spacing {
            interval: 3.0,
            initial_offset: 0.0,
        },
        ..LabelConfig::default()
    };
    let formatter = LabelFormatter::default();
    let planner = LabelPlanner::new(&config, &formatter, &SegmentCrossings);
    let path = Path::new(vec![
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(10.0, 0.0),
    ]);
    let line = LineContext {
        level: 0.0,
        line_index: 0,
        header: None,
        color: [0, 0, 0, 255],
    };
    let labels = planner.plan(&path, &line, &LabelIndex::new()).labels;
    let at: Vec<f64> = labels.iter().map(|l| l.distance).collect();
    assert_eq!(at.len(), 3);
    for (got, want) in at.iter().zip([3.0, 6.0, 9.0]) {
        assert!((got - want).abs() < 1e-9);
    }
}

#[test]
fn count_on_a_closed_polygon() {
    let config = LabelConfig {
        policy: PlacementPolicy::Count {
            n: 4,
            min_separation: 0.0,
            justify: Justify::Spread,
        },
        ..LabelConfig::default()
    };
    let formatter = LabelFormatter::default();
    let planner = LabelPlanner::new(&config, &formatter, &SegmentCrossings);
    // Perimeter 12.
    let path = Path::new(vec![
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(4.0, 2.0),
        Point::new(0.0, 2.0),
        Point::new(0.0, 0.0),
    ]);
    let line = LineContext {
        level: 0.0,
        line_index: 0,
        header: None,
        color: [0, 0, 0, 255],
    };
    let labels = planner.plan(&path, &line, &LabelIndex::new()).labels;
    let at: Vec<f64> = labels.iter().map(|l| l.distance).collect();
    assert_eq!(at.len(), 4);
    for (got, want) in at.iter().zip([3.0, 6.0, 9.0, 12.0]) {
        assert!((got - want).abs() < 1e-9);
    }
    assert!(labels[3].anchor.distance(Point::new(0.0, 0.0)) < 1e-9);
}

#[test]
fn tied_saddle_is_deterministic() {
    let header = GridHeader::new(0.0, 1.0, 0.0, 1.0);
    // NW = 0, NE = 2, SW = 2, SE = 0: both diagonal sums are equal at 1.
    let grid = Grid::new(header, 2, 2, vec![0.0, 2.0, 2.0, 0.0]).unwrap();
    let tracer = ContourTracer::new(&grid, 1.0);
    for _ in 0..10 {
        let mut edges = EdgeVisitationSet::new(2, 2);
        let from_south = tracer
            .trace(&mut edges, CellSide::new(0, 0, Side::South))
            .unwrap()
            .unwrap();
        assert_eq!(
            from_south.path.points(),
            &[Point::new(0.5, 0.0), Point::new(0.0, 0.5)]
        );
        let from_east = tracer
            .trace(&mut edges, CellSide::new(0, 0, Side::East))
            .unwrap()
            .unwrap();
        assert_eq!(
            from_east.path.points(),
            &[Point::new(1.0, 0.5), Point::new(0.5, 1.0)]
        );
        assert_eq!(edges.count_set(), 4);
    }
}

#[test]
fn orientation_puts_high_values_on_the_chosen_side() {
    for desired in [1, -1] {
        let config = ContourConfig {
            levels: explicit(&[-0.5, 0.2, 0.6], false),
            orientation: desired,
            ..ContourConfig::default()
        };
        let grid = hills();
        let set = isoline::contour(&grid, &config).unwrap();
        assert!(!set.lines.is_empty());
        for line in &set.lines {
            assert_eq!(handedness(&grid, &line.path), Some(desired));
        }
    }
}

#[test]
fn json_round_trip_of_a_contour_set() {
    let config = ContourConfig {
        levels: explicit(&[5.0], true),
        ..ContourConfig::default()
    };
    let set = isoline::contour(&bump(), &config).unwrap();
    let json = serde_json::to_string(&set).unwrap();
    let back: isoline::ContourSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back.lines.len(), set.lines.len());
    let texts = |s: &isoline::ContourSet| -> Vec<(String, usize)> {
        s.lines[0]
            .labels
            .iter()
            .map(|l| (l.text.clone(), l.node))
            .collect()
    };
    assert_eq!(texts(&back), texts(&set));
    assert!(!texts(&set).is_empty());
}
