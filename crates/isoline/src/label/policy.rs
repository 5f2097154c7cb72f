//! Where labels go along a line.

use serde::{Deserialize, Serialize};

use crate::types::{Path, Point};

/// Placement of a counted set of labels on an open line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Justify {
    /// `n` labels at `1/(n+1), 2/(n+1), ...` of the line.
    #[default]
    Spread,
    /// Labels at both ends and evenly between; a single label is centred.
    Ends,
    /// A single label pinned to the first vertex.
    Start,
    /// A single label pinned to the last vertex.
    End,
}

/// A caller-supplied label location for [`PlacementPolicy::Fixed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedPoint {
    /// Location in plot coordinates.
    pub point: Point,
    /// Text for [`TextKind::PointText`](crate::label::TextKind::PointText).
    #[serde(default)]
    pub text: Option<String>,
}

impl FixedPoint {
    /// A fixed point without its own text.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            point: Point::new(x, y),
            text: None,
        }
    }
}

/// How label candidates are generated. Exactly one policy is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlacementPolicy {
    /// One label every `interval` units of track distance.
    Spacing {
        /// Track distance between labels.
        interval: f64,
        /// On closed lines, the first label sits at this fraction of
        /// `interval` from the start.
        #[serde(default)]
        initial_offset: f64,
    },
    /// A fixed number of labels per line.
    Count {
        /// Labels per line.
        n: usize,
        /// Minimum map distance between consecutive labels.
        #[serde(default)]
        min_separation: f64,
        /// End placement for open lines.
        #[serde(default)]
        justify: Justify,
    },
    /// A label wherever the line crosses one of these lines.
    Crossing {
        /// Lines to intersect with.
        lines: Vec<Path>,
    },
    /// A label at the vertex nearest to each point, if near enough.
    Fixed {
        /// Requested locations.
        points: Vec<FixedPoint>,
        /// Largest accepted distance from a point to its nearest vertex.
        tolerance: f64,
    },
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self::Spacing {
            interval: 1.0,
            initial_offset: 0.0,
        }
    }
}

impl PlacementPolicy {
    /// Reasons the policy can never place a label, if any.
    #[must_use]
    pub fn problem(&self) -> Option<String> {
        match self {
            Self::Spacing {
                interval,
                initial_offset,
            } => {
                if !(interval.is_finite() && *interval > 0.0) {
                    Some(format!("label interval must be positive, got {interval}"))
                } else if !(0.0..=1.0).contains(initial_offset) {
                    Some(format!(
                        "initial label offset must be a fraction in 0..=1, got {initial_offset}"
                    ))
                } else {
                    None
                }
            }
            Self::Count {
                n, min_separation, ..
            } => {
                if *n == 0 {
                    Some("label count must be at least 1".to_string())
                } else if !(min_separation.is_finite() && *min_separation >= 0.0) {
                    Some(format!(
                        "minimum label separation must not be negative, got {min_separation}"
                    ))
                } else {
                    None
                }
            }
            Self::Crossing { .. } => None,
            Self::Fixed { tolerance, .. } => (!(tolerance.is_finite() && *tolerance > 0.0))
                .then(|| format!("fixed-point tolerance must be positive, got {tolerance}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert_eq!(PlacementPolicy::default().problem(), None);
    }

    #[test]
    fn rejects_non_positive_interval() {
        let policy = PlacementPolicy::Spacing {
            interval: 0.0,
            initial_offset: 0.0,
        };
        assert!(policy.problem().unwrap().contains("interval"));
    }

    #[test]
    fn rejects_zero_count() {
        let policy = PlacementPolicy::Count {
            n: 0,
            min_separation: 0.0,
            justify: Justify::Spread,
        };
        assert!(policy.problem().is_some());
    }

    #[test]
    fn rejects_nan_separation() {
        let policy = PlacementPolicy::Count {
            n: 2,
            min_separation: f64::NAN,
            justify: Justify::Spread,
        };
        assert!(policy.problem().unwrap().contains("separation"));
    }

    #[test]
    fn rejects_bad_tolerance() {
        let policy = PlacementPolicy::Fixed {
            points: vec![FixedPoint::new(0.0, 0.0)],
            tolerance: f64::NAN,
        };
        assert!(policy.problem().is_some());
    }

    #[test]
    fn serde_uses_externally_tagged_variants() {
        let json = r#"{"Count":{"n":3}}"#;
        let policy: PlacementPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(
            policy,
            PlacementPolicy::Count {
                n: 3,
                min_separation: 0.0,
                justify: Justify::Spread
            }
        );
    }
}
