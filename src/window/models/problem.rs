//! `WindowProblem` — the immutable description of one region's fit.
//!
//! Built once per region from a [`RegionSeries`] and [`ModelOptions`]. It
//! owns the codec, the resolved simulation layout, the time grid, both
//! windows, and the bound priors, and it answers the questions every
//! strategy asks: simulate these parameters, score them, and where to start.
//!
//! Construction is where data and configuration errors surface; after it
//! succeeds, only numerical failures remain possible.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::Theta,
};
use crate::window::{
    core::{
        grid::{TimeGrid, Window, WindowPair},
        likelihood::{IndexSelection, LikelihoodPrecursor, likelihood_precursor, log_likelihood},
        options::ModelOptions,
        params::{ParamCodec, ParamOrder, ParamVector},
        priors::ResolvedPriors,
        series::{RegionSeries, Series},
        simulation::{SimulatedCurves, SimulationLayout, simulate},
    },
    errors::ModelResult,
};
use ndarray::Array1;

#[derive(Debug, Clone, PartialEq)]
pub struct WindowProblem {
    series: RegionSeries,
    options: ModelOptions,
    codec: ParamCodec,
    layout: SimulationLayout,
    grid: TimeGrid,
    windows: WindowPair,
    priors: Option<ResolvedPriors>,
}

impl WindowProblem {
    /// Validate options, build the codec and layout, and compute windows.
    ///
    /// # Errors
    /// - `InvalidOption` / `InvalidPrior` / `UnknownLogParam` for bad options.
    /// - `EmptyWindow` when a threshold leaves no observation.
    pub fn new(series: RegionSeries, options: ModelOptions) -> ModelResult<Self> {
        options.validate()?;
        let codec = ParamCodec::new(ParamOrder::canonical(), &options.log_params)?;
        let layout = SimulationLayout::resolve(codec.order())?;
        let grid =
            TimeGrid::new(options.burn_in, series.len(), options.forecast_horizon, options.window_size);

        let window_for = |s: Series| {
            Window::trailing(s, series.len(), series.threshold_index(s), options.window_size)
        };
        let windows = WindowPair {
            positive: window_for(Series::Positive)?,
            deceased: window_for(Series::Deceased)?,
        };

        let priors = if options.use_priors && !options.priors.is_empty() {
            Some(options.priors.resolve(codec.order())?)
        } else {
            None
        };

        Ok(Self { series, options, codec, layout, grid, windows, priors })
    }

    pub fn series(&self) -> &RegionSeries {
        &self.series
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn codec(&self) -> &ParamCodec {
        &self.codec
    }

    pub fn layout(&self) -> &SimulationLayout {
        &self.layout
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn windows(&self) -> &WindowPair {
        &self.windows
    }

    pub fn priors(&self) -> Option<&ResolvedPriors> {
        self.priors.as_ref()
    }

    pub fn model_type_name(&self) -> String {
        self.options.model_type_name()
    }

    /// Every index of both windows.
    pub fn default_selection(&self) -> IndexSelection {
        IndexSelection {
            positive: self.windows.positive.indices(),
            deceased: self.windows.deceased.indices(),
        }
    }

    pub fn simulate(&self, params: &ParamVector) -> ModelResult<SimulatedCurves> {
        simulate(params, &self.layout, &self.grid, self.options.log_offset)
    }

    /// Residuals on `selection` (default: both windows).
    pub fn precursor(
        &self, params: &ParamVector, selection: Option<&IndexSelection>,
    ) -> OptResult<LikelihoodPrecursor> {
        let default;
        let selection = match selection {
            Some(s) => s,
            None => {
                default = self.default_selection();
                &default
            }
        };
        likelihood_precursor(
            params,
            &self.layout,
            &self.grid,
            self.options.log_offset,
            &self.series,
            selection,
        )
    }

    /// Data log-likelihood on `selection` (default: both windows).
    pub fn log_likelihood(
        &self, params: &ParamVector, selection: Option<&IndexSelection>,
    ) -> OptResult<f64> {
        let precursor = self.precursor(params, selection)?;
        Ok(log_likelihood(
            &precursor,
            params.get(self.layout.positive.sigma),
            params.get(self.layout.deceased.sigma),
        ))
    }

    /// Starting point: flat curves at the window's mean log level, unit
    /// multipliers, unit noise scales.
    pub fn default_theta(&self) -> ModelResult<Theta> {
        let mut natural = Array1::<f64>::zeros(self.codec.len());
        for s in Series::ALL {
            let layout = self.layout.get(s);
            let counts = self.series.counts(s);
            let window = self.windows.get(s);
            let mean_log = window
                .indices()
                .iter()
                .map(|&i| (counts[i] + self.options.log_offset).ln())
                .sum::<f64>()
                / window.len() as f64;
            natural[layout.intercept] = mean_log.exp();
            natural[layout.slope] = 0.0;
            natural[layout.sigma] = 1.0;
            for &m in &layout.multipliers {
                natural[m] = 1.0;
            }
        }
        self.codec.to_theta(&ParamVector::new(natural))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::errors::ModelError;
    use chrono::NaiveDate;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Construction checks (window computation, a zero log offset)
    // and the default starting point reproducing a flat series exactly.
    // -------------------------------------------------------------------------

    fn series(cases: Vec<f64>, deaths: Vec<f64>, thresholds: (usize, usize)) -> RegionSeries {
        RegionSeries::new(
            "R",
            NaiveDate::from_ymd_opt(2020, 5, 1).expect("date"),
            Array1::from(cases),
            Array1::from(deaths),
            1e6,
            thresholds.0,
            thresholds.1,
        )
        .expect("series")
    }

    #[test]
    // Purpose
    // -------
    // Windows are clipped per series and default selections follow them.
    fn windows_follow_thresholds() {
        // Arrange
        let s = series(vec![5.0; 30], vec![1.0; 30], (3, 25));

        // Act
        let p = WindowProblem::new(s, ModelOptions::default()).expect("problem");

        // Assert
        assert_eq!(p.windows().positive, Window { start: 16, end: 30 });
        assert_eq!(p.windows().deceased, Window { start: 25, end: 30 });
        assert_eq!(p.default_selection().deceased, vec![25, 26, 27, 28, 29]);
    }

    #[test]
    // Purpose
    // -------
    // A zero offset is refused as configuration before any count is read.
    fn zero_offset_is_rejected_as_configuration() {
        let s = series(vec![0.0; 14], vec![1.0; 14], (0, 0));
        let opts = ModelOptions { log_offset: 0.0, ..ModelOptions::default() };
        assert!(matches!(
            WindowProblem::new(s, opts),
            Err(ModelError::InvalidOption { name: "log_offset", .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // The default start fits a flat series with zero residuals.
    //
    // Given
    // -----
    // - 14 days of 100 cases / 10 deaths, offset 0.5, burn-in 20.
    //
    // Expect
    // ------
    // - Every residual is ~0, so ℓ = −n·ln(1) = 0.
    fn default_theta_reproduces_flat_series() {
        // Arrange
        let s = series(vec![100.0; 14], vec![10.0; 14], (0, 0));
        let opts = ModelOptions { log_offset: 0.5, ..ModelOptions::default() };
        let p = WindowProblem::new(s, opts).expect("problem");

        // Act
        let theta = p.default_theta().expect("theta");
        let natural = p.codec().to_natural(&theta).expect("natural");
        let ll = p.log_likelihood(&natural, None).expect("ll");

        // Assert
        assert!(ll.abs() < 1e-9, "ll = {ll}");
    }
}
