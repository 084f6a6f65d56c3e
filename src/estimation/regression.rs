//! Regression strategy (`SM`): per-series OLS on log counts.
//!
//! Purpose
//! -------
//! Fit `ln(y + offset) = a + b·x + Σ_{k=1..6} d_k·DOW_k` over each series'
//! trailing window and turn the coefficient estimates into a Gaussian over
//! θ that is sampled and decoded.
//!
//! Key behaviors
//! -------------
//! - Design columns are `[Intercept, x, DOW1..DOW6]`; `x` is the position in
//!   the window and `DOW_k = 1` when `(i + burn_in) mod 7 == k`.
//! - Coefficient covariance is `s²(XᵀX)⁻¹` with `s² = SSR / (n − p)`.
//! - [`permute_to_order`] moves mean and covariance from design order into
//!   the codec's ordering; `day0` multipliers are the reference level (θ = 0,
//!   zero variance) and sigmas are fixed at the residual standard error.
//! - The block-diagonal θ-space Gaussian is stored as the regression warm
//!   start for later strategies.
//!
//! Invariants & assumptions
//! ------------------------
//! - Intercepts and day multipliers must be logarithmic in the codec, since
//!   the regression estimates their logs.
//! - Fewer rows than coefficients, or a rank-deficient design (e.g. a
//!   weekday missing from a clipped window), is a strategy failure.
use crate::estimation::{
    errors::{StrategyError, StrategyResult},
    traits::{EstimationStrategy, FitContext, StrategyKind, WeightedSamples},
};
use crate::inference::{covariance::permute_to_order, mvn::MultivariateNormal};
use crate::optimization::{
    loglik_optimizer::Theta,
    numerical_stability::transformations::{floor_sigma, safe_ln},
};
use crate::window::{
    core::{
        grid::TimeGrid,
        params::{DAYS_PER_WEEK, intercept_name, multiplier_name, sigma_name, slope_name},
        series::Series,
    },
    errors::ModelError,
    models::problem::WindowProblem,
};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Number of design columns: intercept, trend, six weekday dummies.
pub const N_COEFFICIENTS: usize = 2 + DAYS_PER_WEEK - 1;

/// Regression inputs for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDesign {
    /// Rows × [`N_COEFFICIENTS`].
    pub x: Array2<f64>,
    /// `ln(count + offset)` per row.
    pub y: Array1<f64>,
}

/// Per-series OLS result in design order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRegression {
    pub series: Series,
    /// Names of `coefficients` entries, in design order.
    pub names: Vec<String>,
    pub coefficients: Array1<f64>,
    pub covariance: Array2<f64>,
    /// Residual standard error `s`.
    pub residual_scale: f64,
    pub rows: usize,
}

/// Coefficient names in design order: intercept, slope, day1..day6.
pub fn design_names(series: Series) -> Vec<String> {
    let mut names = vec![intercept_name(series), slope_name(series)];
    names.extend((1..DAYS_PER_WEEK).map(|d| multiplier_name(d, series)));
    names
}

/// Design over the trailing `window_size` observations of `series`.
pub fn build_design(problem: &WindowProblem, series: Series) -> SeriesDesign {
    let counts = problem.series().counts(series);
    let n = counts.len();
    let start = n.saturating_sub(problem.options().window_size);
    let rows = n - start;
    let offset = problem.options().log_offset;
    let burn_in = problem.grid().burn_in();

    let mut x = Array2::<f64>::zeros((rows, N_COEFFICIENTS));
    let mut y = Array1::<f64>::zeros(rows);
    for (row, i) in (start..n).enumerate() {
        x[[row, 0]] = 1.0;
        x[[row, 1]] = row as f64;
        let dow = TimeGrid::day_of_week(i + burn_in);
        if dow > 0 {
            x[[row, 1 + dow]] = 1.0;
        }
        y[row] = safe_ln(counts[i] + offset);
    }
    SeriesDesign { x, y }
}

/// Ordinary least squares with `s²(XᵀX)⁻¹` covariance.
///
/// # Errors
/// - `InsufficientData` when rows ≤ columns.
/// - `SingularDesign` when `XᵀX` is not positive definite.
pub fn ordinary_least_squares(
    design: &SeriesDesign, series: Series,
) -> StrategyResult<SeriesRegression> {
    let (rows, cols) = design.x.dim();
    if rows <= cols {
        return Err(StrategyError::InsufficientData { series: series.label(), rows, params: cols });
    }
    let x = DMatrix::from_fn(rows, cols, |i, j| design.x[[i, j]]);
    let y = DVector::from_iterator(rows, design.y.iter().copied());
    let xtx = x.transpose() * &x;
    let xtx_inv = xtx
        .cholesky()
        .map(|c| c.inverse())
        .ok_or(StrategyError::SingularDesign { series: series.label() })?;
    let beta = &xtx_inv * (x.transpose() * &y);
    let residuals = &y - &x * &beta;
    let ssr = residuals.norm_squared();
    let s2 = ssr / (rows - cols) as f64;

    Ok(SeriesRegression {
        series,
        names: design_names(series),
        coefficients: Array1::from_iter(beta.iter().copied()),
        covariance: Array2::from_shape_fn((cols, cols), |(i, j)| s2 * xtx_inv[(i, j)]),
        residual_scale: s2.sqrt(),
        rows,
    })
}

/// θ-space mean and covariance over the codec's ordering assembled from both
/// series' regressions.
///
/// # Errors
/// - `Model(InvalidOption)` when a regressed name is not logarithmic.
/// - `Inference` when a regressed name is missing from the ordering.
pub fn assemble_theta_gaussian(
    problem: &WindowProblem, fits: &[SeriesRegression],
) -> StrategyResult<(Theta, Array2<f64>)> {
    let codec = problem.codec();
    let order = codec.order();
    let dim = codec.len();
    let mut mean = Array1::<f64>::zeros(dim);
    let mut cov = Array2::<f64>::zeros((dim, dim));

    for fit in fits {
        for name in fit.names.iter().filter(|n| !n.ends_with("_slope")) {
            if !codec.is_log_name(name) {
                return Err(ModelError::InvalidOption {
                    name: "log_params",
                    reason: "regression needs logarithmic intercepts and multipliers",
                }
                .into());
            }
        }
        // Target: design names in codec order.
        let mut target: Vec<&String> = fit.names.iter().collect();
        target.sort_by_key(|n| order.index_of(n));
        let (m, c) = permute_to_order(&fit.coefficients, &fit.covariance, &fit.names, &target)?;
        let positions = target.iter().map(|n| order.position(n)).collect::<Result<Vec<_>, _>>()?;
        for (a, &pa) in positions.iter().enumerate() {
            mean[pa] = m[a];
            for (b, &pb) in positions.iter().enumerate() {
                cov[[pa, pb]] = c[[a, b]];
            }
        }

        let day0 = order.position(&multiplier_name(0, fit.series))?;
        mean[day0] = 0.0;
        let sigma = order.position(&sigma_name(fit.series))?;
        let s = floor_sigma(fit.residual_scale);
        mean[sigma] = if codec.is_log(sigma) { s.ln() } else { s };
    }
    Ok((mean, cov))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegressionStrategy;

impl EstimationStrategy for RegressionStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Regression
    }

    fn estimate(&self, ctx: &mut FitContext<'_>) -> StrategyResult<WeightedSamples> {
        let problem = ctx.problem;
        let fits = Series::ALL
            .into_iter()
            .map(|s| ordinary_least_squares(&build_design(problem, s), s))
            .collect::<StrategyResult<Vec<_>>>()?;
        let (mean, cov) = assemble_theta_gaussian(problem, &fits)?;
        ctx.shared.set_regression_theta(mean.clone());

        let mvn = MultivariateNormal::new(mean, cov)?;
        let mut raw = Vec::with_capacity(problem.options().n_samples);
        let mut log_probs = Vec::with_capacity(problem.options().n_samples);
        let mut skipped = 0;
        for theta in mvn.sample_n(&mut *ctx.rng, problem.options().n_samples) {
            let natural = problem.codec().to_natural(&theta)?;
            match problem.log_likelihood(&natural, None) {
                Ok(lp) => {
                    raw.push(natural);
                    log_probs.push(lp);
                }
                Err(_) => skipped += 1,
            }
        }
        if raw.is_empty() {
            return Err(StrategyError::NonConvergence {
                reason: "no regression draw could be scored".into(),
            });
        }
        let mut samples = WeightedSamples::uniform(raw, log_probs);
        samples.skipped = skipped;
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::test_support::Harness;
    use crate::window::core::{options::ModelOptions, series::RegionSeries};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Design layout (weekday dummies by grid step).
    // - Recovery of known coefficients from noise-free data.
    // - Failure on too few rows and on a rank-deficient design.
    // - Assembly into the codec ordering (day0 reference, fixed sigma).
    // - Agreement of sampled curves with the data on series shorter than
    //   the window.
    // -------------------------------------------------------------------------

    fn problem(cases: Vec<f64>, deaths: Vec<f64>, burn_in: usize) -> WindowProblem {
        let series = RegionSeries::new(
            "R",
            NaiveDate::from_ymd_opt(2020, 7, 1).expect("date"),
            Array1::from(cases),
            Array1::from(deaths),
            1e6,
            0,
            0,
        )
        .expect("series");
        let opts = ModelOptions { log_offset: 0.5, burn_in, window_size: 14, ..ModelOptions::default() };
        WindowProblem::new(series, opts).expect("problem")
    }

    #[test]
    // Purpose
    // -------
    // Weekday dummies follow (i + burn_in) mod 7 with day 0 as reference.
    fn design_marks_weekdays_by_grid_step() {
        // Arrange
        let p = problem(vec![1.0; 14], vec![1.0; 14], 3);

        // Act
        let d = build_design(&p, Series::Positive);

        // Assert
        assert_eq!(d.x.dim(), (14, N_COEFFICIENTS));
        // Row 0 is grid step 3 → DOW3 column (index 4).
        assert_eq!(d.x[[0, 4]], 1.0);
        // Row 4 is grid step 7 → reference day, no dummy set.
        assert_eq!(d.x.row(4).iter().skip(2).sum::<f64>(), 0.0);
        assert_eq!(d.x[[5, 1]], 5.0);
    }

    #[test]
    // Purpose
    // -------
    // Noise-free log-linear data with a weekday effect is recovered exactly.
    //
    // Given
    // -----
    // - ln(y + 0.5) = 3 + 0.05·i + 0.4·[i mod 7 == 3], burn-in 0, 14 days.
    //
    // Expect
    // ------
    // - a = 3, b = 0.05, d3 = 0.4, other d_k = 0, s ≈ 0.
    fn ols_recovers_noise_free_coefficients() {
        // Arrange
        let cases: Vec<f64> = (0..14)
            .map(|i| {
                let bump = if i % 7 == 3 { 0.4 } else { 0.0 };
                (3.0 + 0.05 * i as f64 + bump).exp() - 0.5
            })
            .collect();
        let p = problem(cases, vec![2.0; 14], 0);

        // Act
        let fit = ordinary_least_squares(&build_design(&p, Series::Positive), Series::Positive)
            .expect("fit");

        // Assert
        assert_abs_diff_eq!(fit.coefficients[0], 3.0, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.coefficients[1], 0.05, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.coefficients[4], 0.4, epsilon = 1e-8);
        for k in [2usize, 3, 5, 6, 7] {
            assert_abs_diff_eq!(fit.coefficients[k], 0.0, epsilon = 1e-8);
        }
        assert!(fit.residual_scale < 1e-6);
    }

    #[test]
    fn ols_requires_more_rows_than_coefficients() {
        let p = problem(vec![1.0; 8], vec![1.0; 8], 0);
        let err = ordinary_least_squares(&build_design(&p, Series::Deceased), Series::Deceased)
            .expect_err("too few rows");
        assert_eq!(err, StrategyError::InsufficientData { series: "deceased", rows: 8, params: 8 });
    }

    #[test]
    // Purpose
    // -------
    // A weekday absent from the rows leaves an all-zero column.
    fn ols_rejects_rank_deficient_design() {
        // Arrange
        let design = SeriesDesign {
            x: Array2::from_shape_fn((10, N_COEFFICIENTS), |(i, j)| match j {
                0 => 1.0,
                1 => i as f64,
                2 => 0.0,
                _ => ((i % 5) + 3 == j) as u8 as f64,
            }),
            y: Array1::from_elem(10, 1.0),
        };

        // Act / Assert
        assert_eq!(
            ordinary_least_squares(&design, Series::Positive).expect_err("singular"),
            StrategyError::SingularDesign { series: "positive" }
        );
    }

    #[test]
    // Purpose
    // -------
    // Assembly places coefficients by name, fixes day0 at the reference and
    // sigma at the floored residual scale, with zero variance for both.
    fn assembly_uses_codec_positions() {
        // Arrange
        let p = problem(vec![100.0; 14], vec![10.0; 14], 0);
        let fits: Vec<_> = Series::ALL
            .into_iter()
            .map(|s| ordinary_least_squares(&build_design(&p, s), s).expect("fit"))
            .collect();

        // Act
        let (mean, cov) = assemble_theta_gaussian(&p, &fits).expect("assemble");

        // Assert
        let order = p.codec().order();
        let at = |n: &str| order.position(n).expect("name");
        assert_abs_diff_eq!(mean[at("positive_intercept")], 100.5_f64.ln(), epsilon = 1e-9);
        assert_abs_diff_eq!(mean[at("deceased_intercept")], 10.5_f64.ln(), epsilon = 1e-9);
        assert_eq!(mean[at("day0_positive_multiplier")], 0.0);
        assert_abs_diff_eq!(mean[at("sigma_positive")], 1e-3_f64.ln(), epsilon = 1e-12);
        assert_eq!(cov[[at("sigma_deceased"), at("sigma_deceased")]], 0.0);
        assert_eq!(cov[[at("day0_deceased_multiplier"), at("day0_deceased_multiplier")]], 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Regression draws simulate the observed curve when the series is
    // shorter than the window, so the intercept lands on the first day.
    //
    // Given
    // -----
    // - 12 days (W = 14, burn-in 20) with ln(y + 0.5) = 3 + 0.1·i for cases
    //   and 2.5 + 0.05·i for deaths, no noise.
    //
    // Expect
    // ------
    // - Every window residual of a sampled draw is below 0.05; an anchor
    //   two days early would be off by 2·slope.
    fn regression_draws_track_series_shorter_than_window() {
        // Arrange
        let cases: Vec<f64> = (0..12).map(|i| (3.0 + 0.1 * i as f64).exp() - 0.5).collect();
        let deaths: Vec<f64> = (0..12).map(|i| (2.5 + 0.05 * i as f64).exp() - 0.5).collect();
        let p = problem(cases, deaths, 20);
        let mut harness = Harness::new(9);

        // Act
        let samples = RegressionStrategy.estimate(&mut harness.context(&p)).expect("regression");
        let precursor = p.precursor(&samples.resampled[0], None).expect("precursor");

        // Assert
        for s in Series::ALL {
            let residuals = &precursor.get(s).residuals;
            assert_eq!(residuals.len(), 12);
            let worst = residuals.iter().fold(0.0_f64, |m, r| m.max(r.abs()));
            assert!(worst < 0.05, "{}: worst residual {worst}", s.label());
        }
    }
}
