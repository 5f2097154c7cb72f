//! One-dimensional interpolation used by the path smoother.
//!
//! The smoother treats curve evaluation as a black box behind the
//! [`Interpolator`] trait. [`SplineInterpolator`] is the built-in
//! implementation and supports every [`Kernel`] except
//! [`Kernel::None`], which means "do not smooth".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Interpolation kernel for resampling a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Kernel {
    /// No interpolation; smoothing is disabled.
    None,
    /// Piecewise linear.
    Linear,
    /// Akima spline: local, resistant to overshoot near outliers.
    #[default]
    Akima,
    /// Natural cubic spline (zero curvature at both ends).
    Cubic,
}

impl Kernel {
    /// Fewest knots the kernel can interpolate.
    #[must_use]
    pub const fn min_knots(self) -> usize {
        match self {
            Self::None => 0,
            Self::Linear => 2,
            Self::Akima | Self::Cubic => 4,
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Linear => f.write_str("Linear"),
            Self::Akima => f.write_str("Akima"),
            Self::Cubic => f.write_str("Cubic"),
        }
    }
}

/// Why an interpolation request was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InterpolationError {
    /// [`Kernel::None`] cannot evaluate anything.
    #[error("no interpolation kernel selected")]
    NoKernel,

    /// Knot and value slices differ in length.
    #[error("{knots} knots but {values} values")]
    LengthMismatch {
        /// Number of knots.
        knots: usize,
        /// Number of values.
        values: usize,
    },

    /// Not enough knots for the kernel.
    #[error("{kernel} interpolation needs at least {needed} knots, got {got}")]
    TooFewKnots {
        /// The requested kernel.
        kernel: Kernel,
        /// Minimum knot count.
        needed: usize,
        /// Supplied knot count.
        got: usize,
    },

    /// Knots must be strictly increasing.
    #[error("knot {index} is not greater than its predecessor")]
    NotIncreasing {
        /// Index of the offending knot.
        index: usize,
    },
}

/// Evaluates a 1-D function sampled at `knots` at new positions.
pub trait Interpolator {
    /// Interpolate `values` (sampled at strictly increasing `knots`) at
    /// every position in `at`.
    ///
    /// # Errors
    ///
    /// Returns an [`InterpolationError`] if the kernel cannot handle the
    /// input.
    fn interpolate(
        &self,
        knots: &[f64],
        values: &[f64],
        kernel: Kernel,
        at: &[f64],
    ) -> Result<Vec<f64>, InterpolationError>;
}

impl<T: Interpolator + ?Sized> Interpolator for &T {
    fn interpolate(
        &self,
        knots: &[f64],
        values: &[f64],
        kernel: Kernel,
        at: &[f64],
    ) -> Result<Vec<f64>, InterpolationError> {
        (**self).interpolate(knots, values, kernel, at)
    }
}

/// Built-in linear, Akima, and natural cubic spline evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplineInterpolator;

impl Interpolator for SplineInterpolator {
    fn interpolate(
        &self,
        knots: &[f64],
        values: &[f64],
        kernel: Kernel,
        at: &[f64],
    ) -> Result<Vec<f64>, InterpolationError> {
        check_knots(knots, values, kernel)?;
        Ok(match kernel {
            Kernel::None => return Err(InterpolationError::NoKernel),
            Kernel::Linear => at.iter().map(|&t| linear(knots, values, t)).collect(),
            Kernel::Akima => {
                let slopes = akima_slopes(knots, values);
                at.iter()
                    .map(|&t| hermite(knots, values, &slopes, t))
                    .collect()
            }
            Kernel::Cubic => {
                let curvature = natural_curvature(knots, values);
                at.iter()
                    .map(|&t| cubic(knots, values, &curvature, t))
                    .collect()
            }
        })
    }
}

fn check_knots(knots: &[f64], values: &[f64], kernel: Kernel) -> Result<(), InterpolationError> {
    if kernel == Kernel::None {
        return Err(InterpolationError::NoKernel);
    }
    if knots.len() != values.len() {
        return Err(InterpolationError::LengthMismatch {
            knots: knots.len(),
            values: values.len(),
        });
    }
    if knots.len() < kernel.min_knots() {
        return Err(InterpolationError::TooFewKnots {
            kernel,
            needed: kernel.min_knots(),
            got: knots.len(),
        });
    }
    if let Some(i) = knots.windows(2).position(|w| w[1].partial_cmp(&w[0]) != Some(std::cmp::Ordering::Greater)) {
        return Err(InterpolationError::NotIncreasing { index: i + 1 });
    }
    Ok(())
}

/// Index of the knot interval holding `t`; positions outside the knot
/// range use the first or last interval.
fn interval(knots: &[f64], t: f64) -> usize {
    knots
        .partition_point(|&k| k <= t)
        .saturating_sub(1)
        .min(knots.len() - 2)
}

fn linear(knots: &[f64], values: &[f64], t: f64) -> f64 {
    let i = interval(knots, t);
    let s = (t - knots[i]) / (knots[i + 1] - knots[i]);
    s.mul_add(values[i + 1] - values[i], values[i])
}

/// Akima derivative estimates at every knot.
///
/// Secant slopes are extended by two on each end with linear
/// extrapolation; each knot derivative is a weighted mean of its two
/// neighbouring secants, weighted by the change in slope on the far side.
fn akima_slopes(knots: &[f64], values: &[f64]) -> Vec<f64> {
    let n = knots.len();
    let mut m = vec![0.0; n + 3];
    for i in 0..n - 1 {
        m[i + 2] = (values[i + 1] - values[i]) / (knots[i + 1] - knots[i]);
    }
    m[1] = 2.0f64.mul_add(m[2], -m[3]);
    m[0] = 2.0f64.mul_add(m[1], -m[2]);
    m[n + 1] = 2.0f64.mul_add(m[n], -m[n - 1]);
    m[n + 2] = 2.0f64.mul_add(m[n + 1], -m[n]);

    (0..n)
        .map(|i| {
            let w1 = (m[i + 3] - m[i + 2]).abs();
            let w2 = (m[i + 1] - m[i]).abs();
            if w1 + w2 < f64::EPSILON {
                0.5 * (m[i + 1] + m[i + 2])
            } else {
                w1.mul_add(m[i + 1], w2 * m[i + 2]) / (w1 + w2)
            }
        })
        .collect()
}

/// Cubic Hermite evaluation from values and derivatives at the knots.
fn hermite(knots: &[f64], values: &[f64], slopes: &[f64], t: f64) -> f64 {
    let i = interval(knots, t);
    let h = knots[i + 1] - knots[i];
    let s = (t - knots[i]) / h;
    let s2 = s * s;
    let s3 = s2 * s;
    let h00 = 2.0f64.mul_add(s3, -3.0 * s2) + 1.0;
    let h10 = 2.0f64.mul_add(-s2, s3) + s;
    let h01 = (-2.0f64).mul_add(s3, 3.0 * s2);
    let h11 = s3 - s2;
    h00 * values[i] + h10 * h * slopes[i] + h01 * values[i + 1] + h11 * h * slopes[i + 1]
}

/// Second derivatives of the natural cubic spline, by the Thomas
/// algorithm on the tridiagonal continuity system.
fn natural_curvature(knots: &[f64], values: &[f64]) -> Vec<f64> {
    let n = knots.len();
    let mut curvature = vec![0.0; n];
    if n < 3 {
        return curvature;
    }
    let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];
    for i in 1..n - 1 {
        let a = h[i - 1];
        let b = 2.0 * (h[i - 1] + h[i]);
        let c = h[i];
        let d = 6.0
            * ((values[i + 1] - values[i]) / h[i] - (values[i] - values[i - 1]) / h[i - 1]);
        let denom = a.mul_add(-c_prime[i - 1], b);
        c_prime[i] = c / denom;
        d_prime[i] = a.mul_add(-d_prime[i - 1], d) / denom;
    }
    for i in (1..n - 1).rev() {
        curvature[i] = c_prime[i].mul_add(-curvature[i + 1], d_prime[i]);
    }
    curvature
}

fn cubic(knots: &[f64], values: &[f64], curvature: &[f64], t: f64) -> f64 {
    let i = interval(knots, t);
    let h = knots[i + 1] - knots[i];
    let a = knots[i + 1] - t;
    let b = t - knots[i];
    let (m0, m1) = (curvature[i], curvature[i + 1]);
    (m0 * a.powi(3) + m1 * b.powi(3)) / (6.0 * h)
        + (values[i] / h - m0 * h / 6.0) * a
        + (values[i + 1] / h - m1 * h / 6.0) * b
}
