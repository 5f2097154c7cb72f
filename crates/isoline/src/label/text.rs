//! Label text.
//!
//! The planner never formats text itself. It describes what each label
//! should say with a [`TextKind`] and the numbers in a [`LabelContext`],
//! and a [`LabelSource`] turns that into a string (or declines, which
//! drops the label).

use serde::{Deserialize, Serialize};

/// What a label says.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextKind {
    /// The contour level.
    #[default]
    Level,
    /// The same fixed string on every label.
    Fixed(String),
    /// The header text of the line, if it has one.
    Header,
    /// Distance along the line in plot units.
    PlotDistance,
    /// Distance along the line under the configured distance metric.
    ValueDistance,
    /// The text attached to the fixed point that placed the label.
    PointText,
    /// The index of the line within its level.
    SegmentIndex,
}

/// Everything a [`LabelSource`] may need to produce one label's text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelContext<'a> {
    /// The requested kind of text.
    pub kind: &'a TextKind,
    /// Contour level of the line.
    pub level: f64,
    /// Index of the line among those of its level.
    pub line_index: usize,
    /// Header text of the line, if any.
    pub header: Option<&'a str>,
    /// Plot-unit distance from the start of the line to the anchor.
    pub plot_distance: f64,
    /// Metric distance from the start of the line to the anchor.
    pub value_distance: f64,
    /// Text of the fixed point that placed this label, if any.
    pub point_text: Option<&'a str>,
}

/// Produces label text. Returning `None` drops the candidate.
pub trait LabelSource {
    /// Text for one label.
    fn text(&self, context: &LabelContext<'_>) -> Option<String>;
}

/// The built-in [`LabelSource`].
///
/// Numbers are printed with `precision` decimals when set. Otherwise
/// whole numbers print without decimals and everything else with one.
/// `unit_suffix` is appended to distances.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelFormatter {
    /// Fixed number of decimals.
    #[serde(default)]
    pub precision: Option<usize>,
    /// Appended to distance labels, e.g. `" km"`.
    #[serde(default)]
    pub unit_suffix: String,
}

impl LabelFormatter {
    /// Format a number according to the configured precision.
    #[must_use]
    pub fn number(&self, value: f64) -> String {
        match self.precision {
            Some(p) => format!("{value:.p$}"),
            None if value.fract().abs() < 0.01 => format!("{value:.0}"),
            None => format!("{value:.1}"),
        }
    }
}

impl LabelSource for LabelFormatter {
    fn text(&self, context: &LabelContext<'_>) -> Option<String> {
        match context.kind {
            TextKind::Level => Some(self.number(context.level)),
            TextKind::Fixed(s) => Some(s.clone()),
            TextKind::Header => context.header.map(str::to_string),
            TextKind::PlotDistance => Some(format!(
                "{}{}",
                self.number(context.plot_distance),
                self.unit_suffix
            )),
            TextKind::ValueDistance => Some(format!(
                "{}{}",
                self.number(context.value_distance),
                self.unit_suffix
            )),
            TextKind::PointText => context.point_text.map(str::to_string),
            TextKind::SegmentIndex => Some(context.line_index.to_string()),
        }
    }
}
