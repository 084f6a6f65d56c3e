//! Moving windows and the simulation time grid.
//!
//! Purpose
//! -------
//! Pin down the index arithmetic shared by simulation, likelihood,
//! regression, and prediction.
//!
//! Key behaviors
//! -------------
//! - [`Window::trailing`] is the per-series moving window
//!   `[max(threshold, n - W), n)`.
//! - [`TimeGrid`] spans `burn_in + n + horizon` steps; series index `i` sits
//!   at grid step `i + burn_in`, and the curve is anchored at step
//!   `burn_in + max(n - W, 0)`, the first day of the size-clipped window.
//!
//! Invariants & assumptions
//! ------------------------
//! - `W >= 1`. Windows may be shorter than `W` when a threshold clips them
//!   or the series is short; they are never longer.
//! - Day-of-week for grid step `k` is `k mod 7`.
use crate::window::{
    core::{params::DAYS_PER_WEEK, series::Series},
    errors::{ModelError, ModelResult},
};

/// Half-open index range `[start, end)` into an observed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    /// `[max(threshold, len - size), len)`.
    ///
    /// # Errors
    /// - `EmptyWindow` when the range has no indices.
    pub fn trailing(series: Series, len: usize, threshold: usize, size: usize) -> ModelResult<Self> {
        let start = threshold.max(len.saturating_sub(size));
        if start >= len {
            return Err(ModelError::EmptyWindow { series: series.label() });
        }
        Ok(Self { start, end: len })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn indices(&self) -> Vec<usize> {
        (self.start..self.end).collect()
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}

/// Windows for both series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPair {
    pub positive: Window,
    pub deceased: Window,
}

impl WindowPair {
    pub fn get(&self, series: Series) -> Window {
        match series {
            Series::Positive => self.positive,
            Series::Deceased => self.deceased,
        }
    }
}

/// `TimeGrid` — burn-in, observed span, and forecast horizon on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrid {
    burn_in: usize,
    series_len: usize,
    horizon: usize,
    window_size: usize,
}

impl TimeGrid {
    pub fn new(burn_in: usize, series_len: usize, horizon: usize, window_size: usize) -> Self {
        Self { burn_in, series_len, horizon, window_size }
    }

    /// Number of grid steps.
    pub fn len(&self) -> usize {
        self.burn_in + self.series_len + self.horizon
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn burn_in(&self) -> usize {
        self.burn_in
    }

    pub fn series_len(&self) -> usize {
        self.series_len
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Grid step where the curve equals `intercept - log_offset` (before the
    /// day-of-week multiplier). Series shorter than the window anchor at
    /// their first observation.
    pub fn anchor(&self) -> f64 {
        (self.burn_in + self.series_len.saturating_sub(self.window_size)) as f64
    }

    /// Grid step of observed series index `i`.
    pub fn grid_index(&self, series_index: usize) -> usize {
        series_index + self.burn_in
    }

    /// First grid step after the observed data.
    pub fn forecast_start(&self) -> usize {
        self.burn_in + self.series_len
    }

    /// Day-of-week bucket of grid step `k`.
    pub fn day_of_week(step: usize) -> usize {
        step % DAYS_PER_WEEK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Window clipping (size and threshold), empty-window rejection, and the
    // grid's index arithmetic.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The trailing window honors both the size and the threshold.
    //
    // Given
    // -----
    // - n = 30, W = 14: threshold 5 → [16, 30); threshold 20 → [20, 30).
    // - n = 10, W = 14, threshold 0 → [0, 10).
    fn trailing_window_clips_by_size_and_threshold() {
        assert_eq!(
            Window::trailing(Series::Positive, 30, 5, 14).expect("window"),
            Window { start: 16, end: 30 }
        );
        assert_eq!(
            Window::trailing(Series::Positive, 30, 20, 14).expect("window"),
            Window { start: 20, end: 30 }
        );
        let short = Window::trailing(Series::Deceased, 10, 0, 14).expect("window");
        assert_eq!(short.len(), 10);
    }

    #[test]
    fn trailing_window_rejects_threshold_at_end() {
        let err = Window::trailing(Series::Deceased, 10, 10, 14).expect_err("empty");
        assert_eq!(err, ModelError::EmptyWindow { series: "deceased" });
    }

    #[test]
    // Purpose
    // -------
    // Grid length, anchor, and offsets follow burn-in + n + horizon.
    fn grid_arithmetic() {
        // Arrange
        let grid = TimeGrid::new(5, 30, 10, 14);

        // Assert
        assert_eq!(grid.len(), 45);
        assert_eq!(grid.anchor(), 21.0);
        assert_eq!(grid.grid_index(0), 5);
        assert_eq!(grid.forecast_start(), 35);
        assert_eq!(TimeGrid::day_of_week(15), 1);
    }

    #[test]
    // Purpose
    // -------
    // A series shorter than the window anchors at its first observation,
    // the same row the regression design starts from.
    //
    // Given
    // -----
    // - burn_in 5, n 10, W 14.
    //
    // Expect
    // ------
    // - anchor = grid_index(0) = 5.
    fn short_series_anchors_at_first_observation() {
        let grid = TimeGrid::new(5, 10, 7, 14);
        assert_eq!(grid.anchor(), grid.grid_index(0) as f64);
    }
}
