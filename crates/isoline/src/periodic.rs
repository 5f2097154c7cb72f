//! Helpers for angular values and longitude-periodic paths.

use crate::types::{FULL_TURN, Point, is_wrap_step};

const HALF_TURN: f64 = FULL_TURN / 2.0;

/// Fold an angle into `[-180, 180]`.
fn wrap_half_turn(v: f64) -> f64 {
    let r = v % FULL_TURN;
    if r > HALF_TURN {
        r - FULL_TURN
    } else if r < -HALF_TURN {
        r + FULL_TURN
    } else {
        r
    }
}

/// Remove 360-degree jumps among a small set of angular values.
///
/// If any value differs from the first by more than 180, every value is
/// folded into the same 180-degree window around the first, so that a
/// sign test can detect a crossing: `[359, 1]` becomes `[-1, 1]`.
/// NaN values are left untouched.
pub fn unwrap_angles(z: &mut [f64]) {
    let Some(&z0) = z.first() else {
        return;
    };
    if !z.iter().skip(1).any(|v| (v - z0).abs() > HALF_TURN) {
        return;
    }
    let base = wrap_half_turn(z0);
    z[0] = base;
    for v in z.iter_mut().skip(1) {
        let mut w = wrap_half_turn(*v);
        let dz = w - base;
        if dz.abs() > HALF_TURN {
            w -= FULL_TURN.copysign(dz);
        }
        *v = w;
    }
}

/// Net longitude travelled along the path, ignoring exact wrap steps.
fn net_longitude(points: &[Point]) -> f64 {
    points
        .windows(2)
        .filter(|w| !is_wrap_step(w[0], w[1]))
        .map(|w| w[1].x - w[0].x)
        .sum()
}

/// Whether a path that crossed the dateline circles a pole.
///
/// A path around a pole accumulates a full turn of longitude once the
/// wrap steps are discounted; one that merely straddles the dateline
/// comes back to where it started.
#[must_use]
pub fn encloses_pole(points: &[Point]) -> bool {
    net_longitude(points).abs() > HALF_TURN
}

/// Shift vertices so that no ordinary step jumps by more than 180 in x.
///
/// Exact wrap steps are left alone; they are the record of a dateline
/// crossing, not an error.
pub fn remove_longitude_jumps(points: &mut [Point]) {
    let mut offset = 0.0;
    let mut prev_original: Option<Point> = None;
    for p in points.iter_mut() {
        let original = *p;
        if let Some(prev) = prev_original
            && !is_wrap_step(prev, original)
        {
            let dx = original.x - prev.x;
            if dx.abs() > HALF_TURN {
                offset -= FULL_TURN.copysign(dx);
            }
        }
        if offset != 0.0 {
            p.x += offset;
        }
        prev_original = Some(original);
    }
}
