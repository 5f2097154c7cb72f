//! isoline: Contour extraction and label placement (sans-IO).
//!
//! Turns a 2-D scalar field sampled on a regular grid into labelled
//! contour lines through:
//! level sweep -> trace (saddles, NaN walls, dateline wrap) -> stitch ->
//! orient -> smooth -> plan labels -> splice labels -> collect.
//!
//! This crate has **no I/O dependencies**: it borrows a grid through the
//! [`ScalarField`] trait and returns structured data. Reading grids,
//! parsing arguments, and installing a log subscriber live in
//! `isoline-bench`.
//!
//! ```
//! use isoline::{ContourConfig, ContourLevel, Grid, GridHeader, LevelSet};
//!
//! let grid = Grid::from_fn(GridHeader::new(-1.0, 1.0, -1.0, 1.0), 11, 11, |x, y| {
//!     x * x + y * y
//! })?;
//! let config = ContourConfig {
//!     levels: LevelSet::Explicit(vec![ContourLevel::annotated(0.5)]),
//!     ..ContourConfig::default()
//! };
//! let set = isoline::contour(&grid, &config)?;
//! assert_eq!(set.lines.len(), 1);
//! assert!(set.lines[0].closed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod collect;
pub mod config;
pub mod diagnostics;
pub mod edges;
pub mod engine;
pub mod grid;
pub mod interp;
pub mod label;
pub mod orient;
pub mod periodic;
pub mod smooth;
pub mod splice;
pub mod trace;
pub mod types;

pub use collect::{ContourCollector, LabelIndex};
pub use config::{
    ContourConfig, ContourLevel, LabelConfig, LevelSet, SmoothingConfig, SpecialLevel,
    StyleConfig,
};
pub use diagnostics::{Clock, ContourDiagnostics, LevelDiagnostics, NoClock};
pub use edges::{EdgeVisitationSet, Orientation};
pub use engine::{ContourEngine, ContourSet, contour};
pub use grid::{Grid, GridError, GridHeader, Registration, ScalarField};
pub use interp::{InterpolationError, Interpolator, Kernel, SplineInterpolator};
pub use label::{LabelPlan, LabelPlanner, LineContext, PlacementPolicy};
pub use orient::orient;
pub use smooth::{PathSmoother, smooth};
pub use splice::{insert_labels, stitch};
pub use trace::{CellSide, ContourTracer, LevelSweep, RawContour, Side};
pub use types::{
    ContourError, ContourLine, Label, LineStyle, Path, PathEnd, Point, Rgba, TraceError,
};
