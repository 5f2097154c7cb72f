//! Optional arc-length resampling of traced paths.
//!
//! A path is parameterised by cumulative arc length and `x(t)`, `y(t)`
//! are resampled through an [`Interpolator`]. Original vertices are kept
//! exactly, so closure and dateline wrap pairs survive, and every new
//! point between two vertices is clamped into their bounding box so a
//! spline cannot overshoot into a self-intersection.

use crate::interp::{InterpolationError, Interpolator, Kernel, SplineInterpolator};
use crate::types::{Path, Point, is_wrap_step};

/// Resamples paths by a constant factor using a pluggable interpolator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSmoother<I = SplineInterpolator> {
    factor: usize,
    kernel: Kernel,
    interpolator: I,
}

impl PathSmoother {
    /// A smoother using the built-in [`SplineInterpolator`].
    #[must_use]
    pub const fn new(factor: usize, kernel: Kernel) -> Self {
        Self {
            factor,
            kernel,
            interpolator: SplineInterpolator,
        }
    }
}

impl<I: Interpolator> PathSmoother<I> {
    /// A smoother delegating curve evaluation to `interpolator`.
    #[must_use]
    pub const fn with_interpolator(factor: usize, kernel: Kernel, interpolator: I) -> Self {
        Self {
            factor,
            kernel,
            interpolator,
        }
    }

    /// Whether this smoother leaves every path untouched.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.factor == 0 || self.kernel == Kernel::None
    }

    /// Smooth `path`, falling back to the input if interpolation fails.
    #[must_use]
    pub fn smooth(&self, path: Path) -> Path {
        if self.is_identity() || path.len() < 4 {
            return path;
        }
        match self.try_smooth(&path) {
            Ok(smoothed) => smoothed,
            Err(e) => {
                tracing::warn!(kernel = %self.kernel, points = path.len(), "smoothing failed, keeping raw path: {e}");
                path
            }
        }
    }

    /// Smooth `path`, reporting interpolation failures.
    ///
    /// # Errors
    ///
    /// Returns the [`InterpolationError`] of the first piece the kernel
    /// could not handle.
    pub fn try_smooth(&self, path: &Path) -> Result<Path, InterpolationError> {
        if self.is_identity() || path.len() < 4 {
            return Ok(path.clone());
        }
        let points = dedupe(path.points());
        let mut out = Vec::with_capacity(points.len() * self.factor);
        for piece in split_at_wraps(&points) {
            if piece.len() < self.kernel.min_knots().max(2) {
                out.extend_from_slice(piece);
            } else {
                self.resample(piece, &mut out)?;
            }
        }
        Ok(Path::new(out))
    }

    /// Resample one wrap-free piece into `out`.
    #[allow(clippy::cast_precision_loss)]
    fn resample(&self, piece: &[Point], out: &mut Vec<Point>) -> Result<(), InterpolationError> {
        let knots = Path::new(piece.to_vec()).arc_lengths();
        let total = knots[knots.len() - 1];
        let n_out = (self.factor * piece.len()).saturating_sub(1).max(2);
        let step = total / (n_out - 1) as f64;
        let tolerance = step * 1e-9;

        let mut samples = Vec::with_capacity(n_out + piece.len());
        let mut k = 0;
        for j in 0..n_out {
            let s = if j + 1 == n_out { total } else { j as f64 * step };
            let mut on_knot = false;
            while k < knots.len() && knots[k] <= s + tolerance {
                on_knot |= (knots[k] - s).abs() <= tolerance;
                samples.push(Sample::Knot(k));
                k += 1;
            }
            if !on_knot {
                samples.push(Sample::Between {
                    t: s,
                    lo: k.saturating_sub(1),
                });
            }
        }
        samples.extend((k..knots.len()).map(Sample::Knot));

        let between: Vec<f64> = samples
            .iter()
            .filter_map(|s| match *s {
                Sample::Between { t, .. } => Some(t),
                Sample::Knot(_) => None,
            })
            .collect();
        let xs: Vec<f64> = piece.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = piece.iter().map(|p| p.y).collect();
        let new_x = self.interpolator.interpolate(&knots, &xs, self.kernel, &between)?;
        let new_y = self.interpolator.interpolate(&knots, &ys, self.kernel, &between)?;

        let mut fresh = new_x.into_iter().zip(new_y);
        for sample in samples {
            match sample {
                Sample::Knot(i) => out.push(piece[i]),
                Sample::Between { lo, .. } => {
                    if let Some((x, y)) = fresh.next() {
                        out.push(clamp_between(Point::new(x, y), piece[lo], piece[lo + 1]));
                    }
                }
            }
        }
        Ok(())
    }
}

/// A resampling position: an original vertex, or a new point strictly
/// between vertices `lo` and `lo + 1`.
#[derive(Debug, Clone, Copy)]
enum Sample {
    Knot(usize),
    Between { t: f64, lo: usize },
}

/// Smooth with the built-in interpolator.
#[must_use]
pub fn smooth(path: Path, factor: usize, kernel: Kernel) -> Path {
    PathSmoother::new(factor, kernel).smooth(path)
}

/// Drop vertices identical to their predecessor.
fn dedupe(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().is_none_or(|&prev| prev.distance_squared(p) > 0.0) {
            out.push(p);
        }
    }
    out
}

/// Split at exact wrap steps; each piece is free of dateline jumps.
fn split_at_wraps(points: &[Point]) -> impl Iterator<Item = &[Point]> {
    let mut start = 0;
    let mut cuts = points
        .windows(2)
        .enumerate()
        .filter(|(_, w)| is_wrap_step(w[0], w[1]))
        .map(|(i, _)| i + 1)
        .chain(std::iter::once(points.len()));
    std::iter::from_fn(move || {
        let end = cuts.next()?;
        let piece = &points[start..end];
        start = end;
        Some(piece)
    })
}

/// Clamp `p` into the per-axis bounding box of `a` and `b`.
fn clamp_between(p: Point, a: Point, b: Point) -> Point {
    Point::new(
        p.x.clamp(a.x.min(b.x), a.x.max(b.x)),
        p.y.clamp(a.y.min(b.y), a.y.max(b.y)),
    )
}
