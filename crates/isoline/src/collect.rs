//! The engine's output list and the spatial index of placed labels.

use rstar::RTree;

use crate::types::{ContourLine, Label, LineStyle, Path, Point};

/// Anchors of every label on finished lines, for isolation checks.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    tree: RTree<[f64; 2]>,
}

impl LabelIndex {
    /// An empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a label anchor.
    pub fn insert(&mut self, anchor: Point) {
        self.tree.insert([anchor.x, anchor.y]);
    }

    /// Whether any recorded anchor lies strictly closer than `distance`
    /// to `point`.
    #[must_use]
    pub fn any_within(&self, point: Point, distance: f64) -> bool {
        if distance <= 0.0 {
            return false;
        }
        let r2 = distance * distance;
        self.tree
            .locate_within_distance([point.x, point.y], r2)
            .any(|&[x, y]| Point::new(x, y).distance_squared(point) < r2)
    }

    /// Number of recorded anchors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Owns the finished contour lines, in the order they were completed.
///
/// Lines are never modified once appended. Their label anchors are added
/// to a [`LabelIndex`] so later lines can keep their labels clear.
#[derive(Debug, Clone, Default)]
pub struct ContourCollector {
    lines: Vec<ContourLine>,
    index: LabelIndex,
}

impl ContourCollector {
    /// An empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finalise one line and append it.
    pub fn finish(
        &mut self,
        path: Path,
        level: f64,
        annotated: bool,
        style: LineStyle,
        labels: Vec<Label>,
    ) -> &ContourLine {
        for label in &labels {
            self.index.insert(label.anchor);
        }
        let closed = path.is_closed();
        self.lines.push(ContourLine {
            path,
            level,
            annotated,
            closed,
            style,
            labels,
        });
        &self.lines[self.lines.len() - 1]
    }

    /// Label anchors of every finished line.
    #[must_use]
    pub const fn index(&self) -> &LabelIndex {
        &self.index
    }

    /// The finished lines.
    #[must_use]
    pub fn lines(&self) -> &[ContourLine] {
        &self.lines
    }

    /// Number of finished lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no line has been finished.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Consume the collector, returning the lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<ContourLine> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(x: f64, y: f64) -> Label {
        Label {
            anchor: Point::new(x, y),
            position: Point::new(x, y),
            distance: 0.0,
            node: 0,
            line_angle: 0.0,
            angle: 0.0,
            text: "1".to_string(),
            color: [0, 0, 0, 255],
            end: None,
        }
    }

    #[test]
    fn index_distance_is_strict() {
        let mut index = LabelIndex::new();
        index.insert(Point::new(0.0, 0.0));
        assert!(index.any_within(Point::new(0.5, 0.0), 1.0));
        assert!(!index.any_within(Point::new(1.0, 0.0), 1.0));
        assert!(!index.any_within(Point::new(0.5, 0.0), 0.0));
    }

    #[test]
    fn finish_appends_and_indexes_labels() {
        let mut collector = ContourCollector::new();
        let ring = Path::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(0.0, 0.0),
        ]);
        let line = collector.finish(ring, 5.0, true, LineStyle::default(), vec![label(1.0, 0.0)]);
        assert!(line.closed);
        assert_eq!(line.labels.len(), 1);

        let open = Path::new(vec![Point::new(5.0, 5.0), Point::new(6.0, 6.0)]);
        collector.finish(open, 10.0, false, LineStyle::default(), Vec::new());
        assert_eq!(collector.len(), 2);
        assert!(!collector.lines()[1].closed);
        assert_eq!(collector.index().len(), 1);
        assert!(collector.index().any_within(Point::new(1.1, 0.0), 0.5));
    }
}
