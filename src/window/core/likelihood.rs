//! Log-space Gaussian likelihood of observed counts under a simulated curve.
//!
//! Purpose
//! -------
//! Compare simulated and observed counts on selected indices and reduce the
//! residuals to a scalar log-likelihood.
//!
//! Key behaviors
//! -------------
//! - [`likelihood_precursor`] returns residuals plus the diagnostics a
//!   caller may want (actual/predicted logs, observed values, the simulated
//!   solution).
//! - [`gaussian_log_likelihood`] is `−Σr²/(2σ²) − n·ln σ` with σ floored at
//!   [`SIGMA_FLOOR`](crate::optimization::numerical_stability::transformations::SIGMA_FLOOR);
//!   constants are dropped.
//!
//! Invariants & assumptions
//! ------------------------
//! - For index `i`: `actual = ln(observed[i] + offset)`,
//!   `predicted = ln(simulated[i + burn_in] + offset)`,
//!   `residual = predicted − actual`.
//! - Index sets may contain repeats (bootstrap resamples); each occurrence
//!   contributes once.
//! - Errors are [`OptError`] so the optimizer adapter can surface them
//!   directly.
use crate::optimization::{
    errors::{OptError, OptResult},
    numerical_stability::transformations::floor_sigma,
};
use crate::window::core::{
    grid::TimeGrid,
    params::ParamVector,
    series::{RegionSeries, Series},
    simulation::{SimulatedCurves, SimulationLayout, simulate},
};

/// Series indices entering the likelihood, per series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSelection {
    pub positive: Vec<usize>,
    pub deceased: Vec<usize>,
}

impl IndexSelection {
    pub fn get(&self, series: Series) -> &[usize] {
        match series {
            Series::Positive => &self.positive,
            Series::Deceased => &self.deceased,
        }
    }
}

/// Residuals and diagnostics for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesResiduals {
    pub residuals: Vec<f64>,
    pub predicted_log: Vec<f64>,
    pub actual_log: Vec<f64>,
    pub observed: Vec<f64>,
}

impl SeriesResiduals {
    pub fn len(&self) -> usize {
        self.residuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residuals.is_empty()
    }

    pub fn sum_of_squares(&self) -> f64 {
        self.residuals.iter().map(|r| r * r).sum()
    }
}

/// Everything computed on the way to the scalar likelihood.
#[derive(Debug, Clone, PartialEq)]
pub struct LikelihoodPrecursor {
    pub positive: SeriesResiduals,
    pub deceased: SeriesResiduals,
    pub solution: SimulatedCurves,
}

impl LikelihoodPrecursor {
    pub fn get(&self, series: Series) -> &SeriesResiduals {
        match series {
            Series::Positive => &self.positive,
            Series::Deceased => &self.deceased,
        }
    }
}

/// Simulate `params` and compute residuals on `selection`.
///
/// # Errors
/// - `OptError::EmptyIndexSet` when a series selects no index.
/// - `OptError::IndexOutOfRange` for an index past the series end.
/// - `OptError::NonPositiveLogArgument` when `value + offset <= 0`.
/// - `OptError::RejectedParameters` when the simulation rejects `params`.
pub fn likelihood_precursor(
    params: &ParamVector, layout: &SimulationLayout, grid: &TimeGrid, log_offset: f64,
    series: &RegionSeries, selection: &IndexSelection,
) -> OptResult<LikelihoodPrecursor> {
    let solution = simulate(params, layout, grid, log_offset)
        .map_err(|e| OptError::RejectedParameters { text: e.to_string() })?;
    let positive = series_residuals(
        series.counts(Series::Positive).as_slice(),
        solution.get(Series::Positive).as_slice(),
        selection.get(Series::Positive),
        grid,
        log_offset,
    )?;
    let deceased = series_residuals(
        series.counts(Series::Deceased).as_slice(),
        solution.get(Series::Deceased).as_slice(),
        selection.get(Series::Deceased),
        grid,
        log_offset,
    )?;
    Ok(LikelihoodPrecursor { positive, deceased, solution })
}

/// `−Σr²/(2σ²) − n·ln σ` with σ floored at
/// [`SIGMA_FLOOR`](crate::optimization::numerical_stability::transformations::SIGMA_FLOOR).
pub fn gaussian_log_likelihood(residuals: &[f64], sigma: f64) -> f64 {
    let sigma = floor_sigma(sigma);
    let ssq: f64 = residuals.iter().map(|r| r * r).sum();
    -ssq / (2.0 * sigma * sigma) - residuals.len() as f64 * sigma.ln()
}

/// Sum of the two per-series Gaussian terms.
pub fn log_likelihood(precursor: &LikelihoodPrecursor, sigma_positive: f64, sigma_deceased: f64) -> f64 {
    gaussian_log_likelihood(&precursor.positive.residuals, sigma_positive)
        + gaussian_log_likelihood(&precursor.deceased.residuals, sigma_deceased)
}

// ---- Helper methods ----

fn series_residuals(
    observed: Option<&[f64]>, simulated: Option<&[f64]>, indices: &[usize], grid: &TimeGrid,
    log_offset: f64,
) -> OptResult<SeriesResiduals> {
    let (observed, simulated) = match (observed, simulated) {
        (Some(o), Some(s)) => (o, s),
        _ => return Err(OptError::NonContiguousSeries),
    };
    if indices.is_empty() {
        return Err(OptError::EmptyIndexSet);
    }
    let mut out = SeriesResiduals {
        residuals: Vec::with_capacity(indices.len()),
        predicted_log: Vec::with_capacity(indices.len()),
        actual_log: Vec::with_capacity(indices.len()),
        observed: Vec::with_capacity(indices.len()),
    };
    for &i in indices {
        let obs = *observed.get(i).ok_or(OptError::IndexOutOfRange { index: i, len: observed.len() })?;
        let k = grid.grid_index(i);
        let sim = *simulated.get(k).ok_or(OptError::IndexOutOfRange { index: k, len: simulated.len() })?;
        let actual = positive_ln(obs + log_offset, i)?;
        let predicted = positive_ln(sim + log_offset, i)?;
        out.residuals.push(predicted - actual);
        out.predicted_log.push(predicted);
        out.actual_log.push(actual);
        out.observed.push(obs);
    }
    Ok(out)
}

fn positive_ln(x: f64, index: usize) -> OptResult<f64> {
    if !(x > 0.0) || !x.is_finite() {
        return Err(OptError::NonPositiveLogArgument { index, value: x });
    }
    Ok(x.ln())
}
