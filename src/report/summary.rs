//! Sample summaries shared by the parameter and prediction tables.
//!
//! Percentiles use linear interpolation between closest ranks: for sorted
//! values `a[0..n)` and level `q`, position `h = (n − 1)·q/100` gives
//! `a[⌊h⌋] + (h − ⌊h⌋)·(a[⌊h⌋+1] − a[⌊h⌋])`. Standard deviations are
//! population (divide by `n`).
use serde::{Deserialize, Serialize};

/// Percentile levels reported for every quantity.
pub const PERCENTILES: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];

/// Column suffixes matching [`PERCENTILES`].
pub const PERCENTILE_LABELS: [&str; 5] = ["p5", "p25", "p50", "p75", "p95"];

/// Linear-interpolation percentile of already sorted values.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let h = (n - 1) as f64 * q.clamp(0.0, 100.0) / 100.0;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Mean and population standard deviation.
pub fn mean_and_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Some((mean, var.sqrt()))
}

/// Mean, optional spread, and the five reported percentiles of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_err: Option<f64>,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

impl SummaryStats {
    /// Summarize `values`; non-finite entries are ignored. `None` when
    /// nothing finite remains.
    pub fn from_values(values: &[f64], with_spread: bool) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);
        let (mean, std) = mean_and_std(&sorted)?;
        let p = |q: f64| percentile(&sorted, q).unwrap_or(f64::NAN);
        Some(Self {
            mean,
            std_err: with_spread.then_some(std),
            p5: p(PERCENTILES[0]),
            p25: p(PERCENTILES[1]),
            p50: p(PERCENTILES[2]),
            p75: p(PERCENTILES[3]),
            p95: p(PERCENTILES[4]),
        })
    }

    /// Percentiles in [`PERCENTILES`] order.
    pub fn percentiles(&self) -> [f64; 5] {
        [self.p5, self.p25, self.p50, self.p75, self.p95]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Interpolated percentiles on small samples, population spread, and
    // filtering of non-finite values.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Percentiles interpolate linearly between ranks.
    //
    // Given
    // -----
    // - Values 1..=5.
    //
    // Expect
    // ------
    // - p5 = 1.2, p25 = 2, p50 = 3, p95 = 4.8.
    fn percentile_interpolates_between_ranks() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_abs_diff_eq!(percentile(&sorted, 5.0).expect("p5"), 1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(&sorted, 25.0).expect("p25"), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(&sorted, 50.0).expect("p50"), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(&sorted, 95.0).expect("p95"), 4.8, epsilon = 1e-12);
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(percentile(&[7.0], 95.0), Some(7.0));
    }

    #[test]
    fn summary_uses_population_spread_and_skips_non_finite() {
        // Arrange
        let values = [4.0, f64::NAN, 2.0, f64::INFINITY];

        // Act
        let with = SummaryStats::from_values(&values, true).expect("stats");
        let without = SummaryStats::from_values(&values, false).expect("stats");

        // Assert
        assert_abs_diff_eq!(with.mean, 3.0);
        assert_abs_diff_eq!(with.std_err.expect("spread"), 1.0);
        assert_eq!(without.std_err, None);
        assert_abs_diff_eq!(with.p50, 3.0);
        assert_eq!(SummaryStats::from_values(&[f64::NAN], true), None);
    }
}
