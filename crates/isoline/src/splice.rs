//! Path surgery: joining two half-traces and splicing label anchors in as
//! explicit vertices.

use crate::types::{Label, Path, is_wrap_step};

/// Join two traces that left the same starting edge in opposite
/// directions.
///
/// `back` is reversed and prepended to `forward`. Its first vertex is the
/// shared starting crossing and is dropped, unless it is the periodic wrap
/// twin of `forward`'s start, in which case it is kept so the seam stays
/// an exact wrap step.
#[must_use]
pub fn stitch(forward: Path, back: Path) -> Path {
    let mut back = back.into_points();
    let keep_first = matches!(
        (back.first(), forward.first()),
        (Some(&b), Some(&a)) if is_wrap_step(b, a)
    );
    if !keep_first && !back.is_empty() {
        back.remove(0);
    }
    back.reverse();
    back.extend(forward.into_points());
    Path::new(back)
}

/// Insert every label anchor into `path` as a new vertex.
///
/// Labels are reordered by owning vertex, then by distance along the
/// path. A label owned by vertex `i` is inserted straight after it, and
/// its `node` is rewritten to the index of the inserted vertex. The
/// output has exactly `path.len() + labels.len()` vertices; a closed path
/// stays closed because no label is ever owned by the closing vertex.
#[must_use]
pub fn insert_labels(path: Path, labels: &mut [Label]) -> Path {
    if labels.is_empty() {
        return path;
    }
    labels.sort_by(|a, b| {
        a.node
            .cmp(&b.node)
            .then_with(|| a.distance.total_cmp(&b.distance))
    });

    let points = path.into_points();
    let last = points.len().saturating_sub(1);
    let mut out = Vec::with_capacity(points.len() + labels.len());
    let mut pending = labels.iter_mut().peekable();
    for (i, point) in points.into_iter().enumerate() {
        out.push(point);
        while let Some(label) = pending.next_if(|l| l.node.min(last.saturating_sub(1)) == i) {
            label.node = out.len();
            out.push(label.anchor);
        }
    }
    // Only reachable for an empty path.
    for label in pending {
        label.node = out.len();
        out.push(label.anchor);
    }
    Path::new(out)
}
