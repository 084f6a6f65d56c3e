//! report — tables and plot inputs built from fitted models.
//!
//! Purpose
//! -------
//! Turn the per-strategy samples of fitted [`MovingWindowModel`]s into the
//! artifacts people review: a parameter summary table, a forecast table,
//! and the box/whisker rows a renderer needs.
//!
//! Key behaviors
//! -------------
//! - [`ParameterReport`]: one row per (region, parameter), per-strategy mean,
//!   standard error (Gaussian-summary strategies), and percentiles.
//! - [`PredictionTable`]: per (region, strategy, future date) summaries of
//!   simulated daily and cumulative counts.
//! - [`box_summaries`] / [`whisker_plot_filename`]: plot inputs only.
//! - CSV and JSON output through [`writers`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Failed or skipped strategies produce empty CSV cells and absent JSON
//!   entries, never zeros.
//!
//! [`MovingWindowModel`]: crate::window::models::moving_window::MovingWindowModel
pub mod errors;
pub mod parameter_report;
pub mod plots;
pub mod prediction;
pub mod summary;
pub mod writers;

pub use self::errors::{ReportError, ReportResult};
pub use self::parameter_report::{ParameterReport, ParameterRow};
pub use self::plots::{BoxSummary, box_summaries, whisker_plot_filename};
pub use self::prediction::{PredictionRow, PredictionTable};
pub use self::summary::SummaryStats;
