//! Contouring diagnostics: timing and counts for every level.
//!
//! These are permanent instrumentation for tuning levels, smoothing, and
//! label parameters. Every engine run collects them alongside the lines.
//!
//! The engine never reads the system clock itself. Timing goes through a
//! caller-supplied [`Clock`]; [`NoClock`] records zero durations.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// A monotonic time source.
pub trait Clock {
    /// A point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// A clock that never advances.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClock;

impl Clock for NoClock {
    type Instant = ();

    fn now(&self) {}

    fn elapsed(&self, _since: &()) -> Duration {
        Duration::ZERO
    }
}

/// Counts for one contour level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelDiagnostics {
    /// Contour level.
    pub level: f64,
    /// Whether the level was annotated.
    pub annotated: bool,
    /// Wall-clock time spent on this level (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Lines emitted.
    pub lines: usize,
    /// Emitted lines that close on themselves.
    pub closed: usize,
    /// Traces that stopped at a NaN region.
    pub nan_terminated: usize,
    /// Lines assembled from two traces.
    pub stitched: usize,
    /// Periodic wrap steps across all traces.
    pub dateline_crossings: usize,
    /// Edge crossings marked visited.
    pub crossings: usize,
    /// Traces dropped for having too few vertices.
    pub discarded: usize,
    /// Traces aborted by an error.
    pub failed: usize,
    /// Labels placed.
    pub labels: usize,
    /// Label candidates dropped for crowding.
    pub rejected_isolation: usize,
    /// Label candidates dropped for lack of text.
    pub rejected_text: usize,
    /// Vertices across emitted lines, label vertices included.
    pub vertices: usize,
}

/// Diagnostics collected from a single engine run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContourDiagnostics {
    /// One entry per level, in tracing order.
    pub levels: Vec<LevelDiagnostics>,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

impl ContourDiagnostics {
    /// Lines emitted across all levels.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.levels.iter().map(|l| l.lines).sum()
    }

    /// Labels placed across all levels.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.levels.iter().map(|l| l.labels).sum()
    }

    /// Vertices across all emitted lines.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.levels.iter().map(|l| l.vertices).sum()
    }

    /// Traces aborted by an error.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.levels.iter().map(|l| l.failed).sum()
    }

    /// Format diagnostics as a human-readable table.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Contour Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "{:>12} {:>3} {:>9} {:>6} {:>6} {:>5} {:>5} {:>6} {:>7} {:>8}",
            "Level", "Ann", "Duration", "Lines", "Closed", "NaN", "Wrap", "Labels", "Crowded", "Vertices"
        ));
        lines.push("-".repeat(80));

        for level in &self.levels {
            let ms = duration_ms(level.duration);
            let ann = if level.annotated { "*" } else { "" };
            let mut row = format!(
                "{:>12} {ann:>3} {ms:>7.3}ms {:>6} {:>6} {:>5} {:>5} {:>6} {:>7} {:>8}",
                format!("{:.6}", level.level)
                    .trim_end_matches('0')
                    .trim_end_matches('.'),
                level.lines,
                level.closed,
                level.nan_terminated,
                level.dateline_crossings,
                level.labels,
                level.rejected_isolation,
                level.vertices,
            );
            if level.discarded > 0 || level.failed > 0 {
                row.push_str(&format!(
                    "  discarded={} failed={}",
                    level.discarded, level.failed
                ));
            }
            lines.push(row);
        }

        lines.push(String::new());
        lines.push(format!(
            "Levels: {}  |  Lines: {}  |  Labels: {}  |  Vertices: {}  |  Total: {:.3}ms",
            self.levels.len(),
            self.line_count(),
            self.label_count(),
            self.vertex_count(),
            duration_ms(self.total_duration),
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
