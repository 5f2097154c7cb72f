//! Configuration for a contouring run.
//!
//! Every struct here is plain data with a [`Default`] and serde support,
//! so a run can be described entirely in JSON. [`ContourConfig::validate`]
//! checks the numeric invariants up front; the engine refuses to trace
//! with an invalid configuration.

use serde::{Deserialize, Serialize};

use crate::interp::Kernel;
use crate::label::{
    AngleMode, DistanceMetric, HalfWidth, LabelFormatter, Nudge, PlacementPolicy, TextKind,
};
use crate::types::{ContourError, LineStyle, Rgba};

/// Largest accepted smoothing factor.
pub const MAX_SMOOTHING_FACTOR: usize = 100;

/// Generated level sets are cut off after this many levels.
pub const MAX_GENERATED_LEVELS: usize = 10_000;

/// One contour level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourLevel {
    /// Field value traced.
    pub value: f64,
    /// Whether lines at this level get labels.
    #[serde(default)]
    pub annotate: bool,
}

impl ContourLevel {
    /// A level that is traced but not labelled.
    #[must_use]
    pub const fn plain(value: f64) -> Self {
        Self {
            value,
            annotate: false,
        }
    }

    /// A labelled level.
    #[must_use]
    pub const fn annotated(value: f64) -> Self {
        Self {
            value,
            annotate: true,
        }
    }
}

/// Which levels to contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelSet {
    /// Exactly these levels, in this order.
    Explicit(Vec<ContourLevel>),
    /// Every multiple of `interval` inside the data range. Multiples of
    /// `annotation_interval` are annotated; zero annotates nothing.
    Interval {
        /// Spacing between levels.
        interval: f64,
        /// Spacing between annotated levels.
        #[serde(default)]
        annotation_interval: f64,
    },
}

impl Default for LevelSet {
    fn default() -> Self {
        Self::Interval {
            interval: 10.0,
            annotation_interval: 50.0,
        }
    }
}

impl LevelSet {
    /// Concrete levels for a grid whose finite values span `data_range`.
    ///
    /// Generated levels start at the first multiple of `interval` at or
    /// above the minimum and stop at the maximum. A grid without finite
    /// values has no generated levels.
    #[must_use]
    pub fn resolve(&self, data_range: Option<(f64, f64)>) -> Vec<ContourLevel> {
        match self {
            Self::Explicit(levels) => levels.clone(),
            Self::Interval {
                interval,
                annotation_interval,
            } => {
                let Some((min, max)) = data_range else {
                    return Vec::new();
                };
                if !(*interval > 0.0) {
                    return Vec::new();
                }
                let first = (min / interval).ceil();
                let mut levels = Vec::new();
                for k in 0..MAX_GENERATED_LEVELS {
                    #[allow(clippy::cast_precision_loss)]
                    let value = (first + k as f64) * interval;
                    if value > max {
                        return levels;
                    }
                    levels.push(ContourLevel {
                        value,
                        annotate: is_multiple(value, *annotation_interval),
                    });
                }
                tracing::warn!(
                    interval,
                    min,
                    max,
                    "level generation stopped after {MAX_GENERATED_LEVELS} levels"
                );
                levels
            }
        }
    }

    fn problem(&self) -> Option<String> {
        match self {
            Self::Explicit(levels) => levels
                .iter()
                .find(|l| !l.value.is_finite())
                .map(|l| format!("contour level must be finite, got {}", l.value)),
            Self::Interval {
                interval,
                annotation_interval,
            } => {
                if !(interval.is_finite() && *interval > 0.0) {
                    Some(format!("contour interval must be positive, got {interval}"))
                } else if !(annotation_interval.is_finite() && *annotation_interval >= 0.0) {
                    Some(format!(
                        "annotation interval must not be negative, got {annotation_interval}"
                    ))
                } else {
                    None
                }
            }
        }
    }
}

/// Whether `value` is a whole multiple of `step`, up to round-off.
fn is_multiple(value: f64, step: f64) -> bool {
    if !(step > 0.0) {
        return false;
    }
    let nearest = (value / step).round() * step;
    (value - nearest).abs() <= 1e-6 * step
}

/// Path resampling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Resampling factor; zero disables smoothing.
    pub factor: usize,
    /// Curve used between vertices.
    pub kernel: Kernel,
}

/// Label placement and presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Where candidates are generated.
    pub policy: PlacementPolicy,
    /// Steps onto vertices with a smaller radius of curvature do not
    /// advance the spacing and count policies.
    pub curvature_floor: f64,
    /// Minimum distance between label anchors; zero disables the check.
    pub isolation: f64,
    /// What labels say.
    pub text: TextKind,
    /// Number formatting for the built-in text source.
    pub format: LabelFormatter,
    /// Display angle relative to the line.
    pub angle: AngleMode,
    /// Tangent fitting window.
    pub half_width: HalfWidth,
    /// Keep the tangent pointing along the path.
    pub directed: bool,
    /// Fold display angles so text is never upside down.
    pub fold_angle: bool,
    /// Offset from anchor to drawn text.
    pub nudge: Nudge,
    /// Measure for distance text.
    pub distance_metric: DistanceMetric,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            policy: PlacementPolicy::default(),
            curvature_floor: 0.0,
            isolation: 0.0,
            text: TextKind::default(),
            format: LabelFormatter::default(),
            angle: AngleMode::default(),
            half_width: HalfWidth::default(),
            directed: false,
            fold_angle: true,
            nudge: Nudge::default(),
            distance_metric: DistanceMetric::default(),
        }
    }
}

impl LabelConfig {
    fn problem(&self) -> Option<String> {
        if let Some(p) = self.policy.problem() {
            return Some(p);
        }
        if !(self.curvature_floor.is_finite() && self.curvature_floor >= 0.0) {
            return Some(format!(
                "curvature floor must not be negative, got {}",
                self.curvature_floor
            ));
        }
        if !(self.isolation.is_finite() && self.isolation >= 0.0) {
            return Some(format!(
                "label isolation must not be negative, got {}",
                self.isolation
            ));
        }
        let nudge_finite = match self.nudge {
            Nudge::None => true,
            Nudge::Absolute { dx, dy } => dx.is_finite() && dy.is_finite(),
            Nudge::AlongLine { along, across } => along.is_finite() && across.is_finite(),
        };
        (!nudge_finite).then(|| "label nudge must be finite".to_string())
    }
}

/// Style overrides for one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialLevel {
    /// Level this override applies to.
    pub level: f64,
    /// Line colour.
    #[serde(default)]
    pub color: Option<Rgba>,
    /// Line width.
    #[serde(default)]
    pub width: Option<f64>,
    /// Text used for every label at this level.
    #[serde(default)]
    pub label: Option<String>,
}

/// Pens and colours of the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Pen for plain levels.
    pub line: LineStyle,
    /// Pen for annotated levels.
    pub annotated_line: LineStyle,
    /// Label text colour.
    pub label_color: Rgba,
    /// Per-level overrides.
    pub special_levels: Vec<SpecialLevel>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            line: LineStyle::default(),
            annotated_line: LineStyle {
                color: [0, 0, 0, 255],
                width: 2.0,
            },
            label_color: [0, 0, 0, 255],
            special_levels: Vec::new(),
        }
    }
}

impl StyleConfig {
    /// The override for `level`, if one matches.
    #[must_use]
    pub fn special(&self, level: f64) -> Option<&SpecialLevel> {
        let tolerance = 1e-9 * level.abs().max(1.0);
        self.special_levels
            .iter()
            .find(|s| (s.level - level).abs() <= tolerance)
    }

    /// Pen for a line at `level`.
    #[must_use]
    pub fn line_style(&self, level: f64, annotated: bool) -> LineStyle {
        let base = if annotated {
            self.annotated_line
        } else {
            self.line
        };
        self.special(level).map_or(base, |s| LineStyle {
            color: s.color.unwrap_or(base.color),
            width: s.width.unwrap_or(base.width),
        })
    }
}

/// Everything that controls one contouring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Levels to trace.
    pub levels: LevelSet,
    /// Side higher values should lie on, looking along the line: `1`
    /// right, `-1` left, `0` as traced.
    pub orientation: i8,
    /// Path resampling.
    pub smoothing: SmoothingConfig,
    /// Lines with fewer vertices are discarded.
    pub min_points: usize,
    /// Labels on annotated levels.
    pub labels: LabelConfig,
    /// Pens and colours.
    pub style: StyleConfig,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            levels: LevelSet::default(),
            orientation: 0,
            smoothing: SmoothingConfig::default(),
            min_points: 2,
            labels: LabelConfig::default(),
            style: StyleConfig::default(),
        }
    }
}

impl ContourConfig {
    /// Check every numeric invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::InvalidConfig`] describing the first
    /// violated invariant.
    pub fn validate(&self) -> Result<(), ContourError> {
        let problem = self
            .levels
            .problem()
            .or_else(|| {
                (!(-1..=1).contains(&self.orientation)).then(|| {
                    format!("orientation must be -1, 0 or 1, got {}", self.orientation)
                })
            })
            .or_else(|| {
                (self.smoothing.factor > MAX_SMOOTHING_FACTOR).then(|| {
                    format!(
                        "smoothing factor must be at most {MAX_SMOOTHING_FACTOR}, got {}",
                        self.smoothing.factor
                    )
                })
            })
            .or_else(|| self.labels.problem())
            .or_else(|| {
                self.style
                    .special_levels
                    .iter()
                    .find(|s| {
                        !s.level.is_finite() || s.width.is_some_and(|w| !(w.is_finite() && w >= 0.0))
                    })
                    .map(|s| format!("special level {} has an invalid level or width", s.level))
            });
        match problem {
            Some(message) => Err(ContourError::InvalidConfig(message)),
            None => Ok(()),
        }
    }
}
