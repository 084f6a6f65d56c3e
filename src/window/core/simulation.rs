//! Deterministic curve simulation on the time grid.
//!
//! For each series and grid step `k`:
//!
//! ```text
//! value_k = max( exp(slope·k) · (intercept − log_offset) / exp(slope·anchor), 0 )
//!           · day{k mod 7}_multiplier
//! ```
//!
//! The curve passes through `intercept − log_offset` at the anchor step, so
//! after adding the offset back in the likelihood, `ln(value + offset)`
//! starts from `ln(intercept)`. An intercept at or below the offset yields an
//! all-zero curve.
//!
//! The exponent is evaluated as `slope·(k − anchor)` to avoid overflow on
//! long grids. Overflowing values saturate at `f64::MAX`.
use crate::window::{
    core::{
        grid::TimeGrid,
        params::{
            DAYS_PER_WEEK, ParamOrder, ParamVector, intercept_name, multiplier_name, sigma_name,
            slope_name,
        },
        series::Series,
    },
    errors::{ModelError, ModelResult},
};
use ndarray::Array1;

/// Vector positions of one series' parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesLayout {
    pub slope: usize,
    pub intercept: usize,
    pub sigma: usize,
    pub multipliers: [usize; DAYS_PER_WEEK],
}

impl SeriesLayout {
    /// # Errors
    /// - `MissingParam` for any of the ten names the series needs.
    pub fn resolve(order: &ParamOrder, series: Series) -> ModelResult<Self> {
        let mut multipliers = [0usize; DAYS_PER_WEEK];
        for (day, slot) in multipliers.iter_mut().enumerate() {
            *slot = order.position(&multiplier_name(day, series))?;
        }
        Ok(Self {
            slope: order.position(&slope_name(series))?,
            intercept: order.position(&intercept_name(series))?,
            sigma: order.position(&sigma_name(series))?,
            multipliers,
        })
    }
}

/// Resolved positions for both series; built once per model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationLayout {
    pub positive: SeriesLayout,
    pub deceased: SeriesLayout,
}

impl SimulationLayout {
    pub fn resolve(order: &ParamOrder) -> ModelResult<Self> {
        Ok(Self {
            positive: SeriesLayout::resolve(order, Series::Positive)?,
            deceased: SeriesLayout::resolve(order, Series::Deceased)?,
        })
    }

    pub fn get(&self, series: Series) -> &SeriesLayout {
        match series {
            Series::Positive => &self.positive,
            Series::Deceased => &self.deceased,
        }
    }
}

/// Simulated daily counts over the full grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedCurves {
    pub positive: Array1<f64>,
    pub deceased: Array1<f64>,
}

impl SimulatedCurves {
    pub fn get(&self, series: Series) -> &Array1<f64> {
        match series {
            Series::Positive => &self.positive,
            Series::Deceased => &self.deceased,
        }
    }
}

/// Simulate both series on `grid`.
///
/// # Errors
/// - `ParamLengthMismatch` when `params` is shorter than the layout needs.
pub fn simulate(
    params: &ParamVector, layout: &SimulationLayout, grid: &TimeGrid, log_offset: f64,
) -> ModelResult<SimulatedCurves> {
    let needed = [layout.positive, layout.deceased]
        .iter()
        .flat_map(|l| l.multipliers.iter().copied().chain([l.slope, l.intercept, l.sigma]))
        .max()
        .map_or(0, |m| m + 1);
    if params.len() < needed {
        return Err(ModelError::ParamLengthMismatch { expected: needed, actual: params.len() });
    }
    Ok(SimulatedCurves {
        positive: simulate_series(params, &layout.positive, grid, log_offset),
        deceased: simulate_series(params, &layout.deceased, grid, log_offset),
    })
}

fn simulate_series(
    params: &ParamVector, layout: &SeriesLayout, grid: &TimeGrid, log_offset: f64,
) -> Array1<f64> {
    let slope = params.get(layout.slope);
    let base = params.get(layout.intercept) - log_offset;
    let anchor = grid.anchor();
    Array1::from_shape_fn(grid.len(), |k| {
        let trend = ((slope * (k as f64 - anchor)).exp() * base).max(0.0);
        let value = trend * params.get(layout.multipliers[TimeGrid::day_of_week(k)]);
        match value {
            v if v.is_nan() => 0.0,
            v if v.is_infinite() => f64::MAX,
            v => v,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::core::params::{ParamCodec, ParameterSet, canonical_param_names};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Output length and non-negativity.
    // - The anchor identity and the zero curve for intercept ≤ offset.
    // - Day-of-week multipliers applied by grid step mod 7.
    // -------------------------------------------------------------------------

    fn params_with(overrides: &[(&str, f64)]) -> ParamVector {
        let mut named: ParameterSet = canonical_param_names()
            .into_iter()
            .map(|n| {
                let v = if n.ends_with("_slope") { 0.0 } else { 1.0 };
                (n, v)
            })
            .collect();
        for (name, value) in overrides {
            named.insert(*name, *value);
        }
        ParamCodec::canonical().to_vector(&named).expect("complete set")
    }

    fn layout() -> SimulationLayout {
        SimulationLayout::resolve(ParamCodec::canonical().order()).expect("layout")
    }

    #[test]
    // Purpose
    // -------
    // Curves span the full grid, are non-negative, and pass through
    // `intercept − offset` at the anchor.
    //
    // Given
    // -----
    // - burn_in 3, n 20, horizon 7, W 14 → anchor step 9 (9 mod 7 = 2).
    // - positive intercept 50, slope 0.1, offset 0.5, multipliers 1.
    //
    // Expect
    // ------
    // - 30 entries, all ≥ 0, value 49.5 at step 9.
    fn simulate_has_grid_length_and_anchor_identity() {
        // Arrange
        let grid = TimeGrid::new(3, 20, 7, 14);
        let p = params_with(&[("positive_intercept", 50.0), ("positive_slope", 0.1)]);

        // Act
        let sim = simulate(&p, &layout(), &grid, 0.5).expect("simulate");

        // Assert
        assert_eq!(sim.positive.len(), 30);
        assert_eq!(sim.deceased.len(), 30);
        assert!(sim.positive.iter().chain(sim.deceased.iter()).all(|v| *v >= 0.0));
        assert!((sim.positive[9] - 49.5).abs() < 1e-9);
        assert!(sim.positive[10] > sim.positive[9]);
    }

    #[test]
    // Purpose
    // -------
    // An intercept at or below the offset flattens the curve to zero.
    fn intercept_below_offset_gives_zero_curve() {
        let grid = TimeGrid::new(0, 14, 5, 14);
        let p = params_with(&[("deceased_intercept", 0.3), ("deceased_slope", 0.2)]);
        let sim = simulate(&p, &layout(), &grid, 0.5).expect("simulate");
        assert!(sim.deceased.iter().all(|v| *v == 0.0));
    }

    #[test]
    // Purpose
    // -------
    // The day-of-week multiplier is chosen by grid step mod 7.
    //
    // Given
    // -----
    // - Flat curve (slope 0, intercept 10.5, offset 0.5) and
    //   day3_positive_multiplier = 2.
    //
    // Expect
    // ------
    // - Steps 3, 10, 17 equal 20; every other step equals 10.
    fn day_of_week_uses_step_mod_seven() {
        // Arrange
        let grid = TimeGrid::new(0, 21, 0, 14);
        let p = params_with(&[("positive_intercept", 10.5), ("day3_positive_multiplier", 2.0)]);

        // Act
        let sim = simulate(&p, &layout(), &grid, 0.5).expect("simulate");

        // Assert
        for (k, v) in sim.positive.iter().enumerate() {
            let expected = if k % 7 == 3 { 20.0 } else { 10.0 };
            assert!((v - expected).abs() < 1e-9, "step {k}: {v}");
        }
    }

    #[test]
    fn layout_requires_every_name() {
        let order = ParamOrder::new(1, vec!["positive_slope".into()]).expect("order");
        assert!(matches!(SimulationLayout::resolve(&order), Err(ModelError::MissingParam { .. })));
    }
}
