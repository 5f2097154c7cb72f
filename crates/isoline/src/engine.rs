//! The contouring driver: levels in, labelled lines out.
//!
//! For every level the engine runs one [`LevelSweep`] and pushes each
//! traced contour through the same steps:
//!
//! 1. Discard lines shorter than `min_points`.
//! 2. Orient so higher values lie on the configured side.
//! 3. Smooth.
//! 4. Plan labels (annotated levels only), keeping clear of labels on
//!    lines already finished.
//! 5. Splice label anchors into the path.
//! 6. Hand the line to the [`ContourCollector`].
//!
//! A trace that fails is logged, counted, and skipped; the sweep carries
//! on with the next starting edge.

use serde::{Deserialize, Serialize};

use crate::collect::ContourCollector;
use crate::config::{ContourConfig, ContourLevel};
use crate::diagnostics::{Clock, ContourDiagnostics, LevelDiagnostics, NoClock};
use crate::grid::{GridError, ScalarField};
use crate::interp::{Interpolator, SplineInterpolator};
use crate::label::{
    CrossingFinder, LabelContext, LabelPlanner, LabelSource, LineContext, SegmentCrossings,
};
use crate::orient::orient;
use crate::smooth::PathSmoother;
use crate::splice::insert_labels;
use crate::trace::LevelSweep;
use crate::types::{ContourError, ContourLine};

/// Everything one run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContourSet {
    /// Finished lines, level by level in tracing order.
    pub lines: Vec<ContourLine>,
    /// Per-level counts and timings.
    pub diagnostics: ContourDiagnostics,
}

/// Runs the full pipeline with pluggable collaborators.
///
/// The default engine evaluates curves with [`SplineInterpolator`],
/// intersects crossing lines with [`SegmentCrossings`], and formats label
/// text with the configuration's [`LabelFormatter`](crate::label::LabelFormatter).
pub struct ContourEngine<I = SplineInterpolator, F = SegmentCrossings> {
    interpolator: I,
    crossings: F,
    labels: Option<Box<dyn LabelSource>>,
}

impl Default for ContourEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ContourEngine {
    /// An engine with the built-in collaborators.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interpolator: SplineInterpolator,
            crossings: SegmentCrossings,
            labels: None,
        }
    }
}

impl<I: Interpolator, F: CrossingFinder> ContourEngine<I, F> {
    /// An engine delegating curve evaluation, crossing detection, and
    /// (when `labels` is set) label text to the caller.
    #[must_use]
    pub fn with_collaborators(
        interpolator: I,
        crossings: F,
        labels: Option<Box<dyn LabelSource>>,
    ) -> Self {
        Self {
            interpolator,
            crossings,
            labels,
        }
    }

    /// Contour `grid` without timing.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::InvalidConfig`] if `config` fails
    /// validation and [`ContourError::Grid`] if the grid has fewer than
    /// 2x2 nodes. Failed traces are not errors; they are counted in the
    /// diagnostics.
    pub fn contour<G: ScalarField + ?Sized>(
        &self,
        grid: &G,
        config: &ContourConfig,
    ) -> Result<ContourSet, ContourError> {
        self.contour_timed(grid, config, &NoClock)
    }

    /// Contour `grid`, timing each level with `clock`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ContourEngine::contour`].
    pub fn contour_timed<G: ScalarField + ?Sized, C: Clock>(
        &self,
        grid: &G,
        config: &ContourConfig,
        clock: &C,
    ) -> Result<ContourSet, ContourError> {
        config.validate()?;
        if grid.n_cols() < 2 || grid.n_rows() < 2 {
            return Err(GridError::TooSmall {
                n_cols: grid.n_cols(),
                n_rows: grid.n_rows(),
            }
            .into());
        }

        let run_start = clock.now();
        let levels = config.levels.resolve(value_range(grid));
        tracing::debug!(levels = levels.len(), "contouring");

        let mut collector = ContourCollector::new();
        let mut diagnostics = ContourDiagnostics::default();
        for level in &levels {
            let level_start = clock.now();
            let mut diag = self.contour_level(grid, config, *level, &mut collector);
            diag.duration = clock.elapsed(&level_start);
            tracing::debug!(
                level = level.value,
                lines = diag.lines,
                labels = diag.labels,
                failed = diag.failed,
                "level done"
            );
            diagnostics.levels.push(diag);
        }
        diagnostics.total_duration = clock.elapsed(&run_start);

        Ok(ContourSet {
            lines: collector.into_lines(),
            diagnostics,
        })
    }

    fn contour_level<G: ScalarField + ?Sized>(
        &self,
        grid: &G,
        config: &ContourConfig,
        level: ContourLevel,
        collector: &mut ContourCollector,
    ) -> LevelDiagnostics {
        let mut diag = LevelDiagnostics {
            level: level.value,
            annotated: level.annotate,
            ..LevelDiagnostics::default()
        };
        let special = config.style.special(level.value);
        let style = config.style.line_style(level.value, level.annotate);
        let smoother = PathSmoother::with_interpolator(
            config.smoothing.factor,
            config.smoothing.kernel,
            &self.interpolator,
        );

        let header = special.and_then(|s| s.label.as_deref());
        let fixed;
        let source: &dyn LabelSource = match header {
            Some(text) => {
                fixed = FixedText(text);
                &fixed
            }
            None => self.labels.as_deref().unwrap_or(&config.labels.format),
        };
        let planner = LabelPlanner::new(&config.labels, source, &self.crossings);

        let mut line_index = 0;
        for traced in LevelSweep::new(grid, level.value) {
            let raw = match traced {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(level = level.value, "trace failed: {e}");
                    diag.failed += 1;
                    continue;
                }
            };
            diag.crossings += raw.crossings;
            diag.nan_terminated += usize::from(raw.nan_terminated);
            diag.stitched += usize::from(raw.stitched);
            diag.dateline_crossings += raw.dateline_crossings;
            if raw.path.len() < config.min_points.max(2) {
                diag.discarded += 1;
                continue;
            }

            let path = orient(grid, raw.path, config.orientation);
            let path = smoother.smooth(path);
            let mut labels = if level.annotate {
                let line = LineContext {
                    level: level.value,
                    line_index,
                    header,
                    color: config.style.label_color,
                };
                let plan = planner.plan(&path, &line, collector.index());
                diag.rejected_isolation += plan.rejected_isolation;
                diag.rejected_text += plan.rejected_text;
                plan.labels
            } else {
                Vec::new()
            };
            let path = insert_labels(path, &mut labels);

            diag.lines += 1;
            diag.closed += usize::from(path.is_closed());
            diag.labels += labels.len();
            diag.vertices += path.len();
            collector.finish(path, level.value, level.annotate, style, labels);
            line_index += 1;
        }
        diag
    }
}

/// Contour `grid` with the default engine.
///
/// # Errors
///
/// Same conditions as [`ContourEngine::contour`].
pub fn contour<G: ScalarField + ?Sized>(
    grid: &G,
    config: &ContourConfig,
) -> Result<ContourSet, ContourError> {
    ContourEngine::new().contour(grid, config)
}

/// The same text on every label of a level.
struct FixedText<'a>(&'a str);

impl LabelSource for FixedText<'_> {
    fn text(&self, _context: &LabelContext<'_>) -> Option<String> {
        Some(self.0.to_string())
    }
}

/// Minimum and maximum of the non-NaN node values.
fn value_range<G: ScalarField + ?Sized>(grid: &G) -> Option<(f64, f64)> {
    (0..grid.n_rows())
        .flat_map(|row| (0..grid.n_cols()).map(move |col| (col, row)))
        .map(|(col, row)| grid.value(col, row))
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
