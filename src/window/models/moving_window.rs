//! Moving-window model: per-region orchestration of the estimation strategies.
//!
//! Purpose
//! -------
//! Own one region's [`WindowProblem`] together with everything that changes
//! while it is fitted: the seeded RNG, the shared maximum-likelihood point,
//! the evaluation log, and one [`StrategyStatus`] per attempted strategy.
//!
//! Key behaviors
//! -------------
//! - [`MovingWindowModel::new`] validates the data and options and computes
//!   windows, grid, and codec; the model starts in [`FitState::Windowed`].
//! - [`MovingWindowModel::run_fits`] runs the configured strategies in the
//!   fixed order of [`StrategyKind::ALL`]; [`MovingWindowModel::run_fits_simplified`]
//!   runs only regression and, when configured, the posterior.
//! - A failing strategy is recorded as [`StrategyStatus::Failed`] and the
//!   remaining strategies still run.
//! - Every success gets a multivariate-normal summary of its resampled draws
//!   in θ space.
//!
//! Invariants & assumptions
//! ------------------------
//! - Each strategy runs at most once per model; a second attempt is rejected
//!   with [`ModelError::StrategyAlreadyAttempted`].
//! - Once [`FitState::Reported`], the model accepts no further fits.
//! - A model is created per region per invocation and never shared.
use crate::cache::SampleCache;
use crate::estimation::{
    strategy::Strategy,
    traits::{
        EstimationStrategy, FitContext, SharedFitState, StrategyFit, StrategyKind, StrategyStatus,
        WeightedSamples,
    },
};
use crate::inference::mvn::MultivariateNormal;
use crate::window::{
    core::{options::ModelOptions, series::RegionSeries},
    errors::{ModelError, ModelResult},
    models::{objective::EvaluationLog, problem::WindowProblem},
};
use rand::{SeedableRng, rngs::StdRng};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Lifecycle of a [`MovingWindowModel`].
///
/// `Constructed` is the state of validated input before windows exist; a
/// model returned by [`MovingWindowModel::new`] is already `Windowed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FitState {
    Constructed,
    Windowed,
    Fitting,
    Reported,
}

impl FitState {
    pub fn label(self) -> &'static str {
        match self {
            FitState::Constructed => "constructed",
            FitState::Windowed => "windowed",
            FitState::Fitting => "fitting",
            FitState::Reported => "reported",
        }
    }
}

pub struct MovingWindowModel {
    problem: WindowProblem,
    state: FitState,
    rng: StdRng,
    shared: SharedFitState,
    evaluations: EvaluationLog,
    results: BTreeMap<StrategyKind, StrategyStatus>,
    cache: Option<Box<dyn SampleCache>>,
}

impl MovingWindowModel {
    /// Build the model for one region.
    ///
    /// # Errors
    /// Any [`ModelError`] from [`WindowProblem::new`].
    pub fn new(series: RegionSeries, options: ModelOptions) -> ModelResult<Self> {
        let seed = options.seed;
        let problem = WindowProblem::new(series, options)?;
        info!(
            region = problem.series().region(),
            model_type = %problem.model_type_name(),
            positive_window = problem.windows().positive.len(),
            deceased_window = problem.windows().deceased.len(),
            "model.windowed"
        );
        Ok(Self {
            problem,
            state: FitState::Windowed,
            rng: StdRng::seed_from_u64(seed),
            shared: SharedFitState::default(),
            evaluations: EvaluationLog::new(),
            results: BTreeMap::new(),
            cache: None,
        })
    }

    /// Attach the sample cache the posterior strategy reads and writes.
    pub fn with_cache(mut self, cache: Box<dyn SampleCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn problem(&self) -> &WindowProblem {
        &self.problem
    }

    pub fn region(&self) -> &str {
        self.problem.series().region()
    }

    pub fn state(&self) -> FitState {
        self.state
    }

    pub fn results(&self) -> &BTreeMap<StrategyKind, StrategyStatus> {
        &self.results
    }

    pub fn status(&self, kind: StrategyKind) -> Option<&StrategyStatus> {
        self.results.get(&kind)
    }

    /// Successful strategies in execution order.
    pub fn successes(&self) -> impl Iterator<Item = (StrategyKind, &StrategyFit)> {
        self.results.iter().filter_map(|(k, s)| s.fit().map(|f| (*k, f)))
    }

    /// Run every configured strategy in execution order.
    ///
    /// # Errors
    /// - `AlreadyFitted` once the model is reported.
    /// - `StrategyAlreadyAttempted` when any configured strategy already ran.
    pub fn run_fits(&mut self) -> ModelResult<()> {
        let kinds: Vec<StrategyKind> =
            StrategyKind::ALL.into_iter().filter(|k| self.problem.options().includes(*k)).collect();
        self.run_kinds(&kinds)
    }

    /// Regression only, plus the posterior when it is configured.
    ///
    /// # Errors
    /// As [`MovingWindowModel::run_fits`].
    pub fn run_fits_simplified(&mut self) -> ModelResult<()> {
        let mut kinds = vec![StrategyKind::Regression];
        if self.problem.options().includes(StrategyKind::Posterior) {
            kinds.push(StrategyKind::Posterior);
        }
        self.run_kinds(&kinds)
    }

    fn run_kinds(&mut self, kinds: &[StrategyKind]) -> ModelResult<()> {
        for &kind in kinds {
            self.run_strategy(&Strategy::for_kind(kind))?;
        }
        Ok(())
    }

    /// Run one strategy and record its outcome.
    ///
    /// A strategy failure is recorded, not returned.
    ///
    /// # Errors
    /// - `AlreadyFitted` once the model is reported.
    /// - `StrategyAlreadyAttempted` when this strategy already ran.
    pub fn run_strategy(&mut self, strategy: &dyn EstimationStrategy) -> ModelResult<&StrategyStatus> {
        let kind = strategy.kind();
        if self.state == FitState::Reported {
            return Err(ModelError::AlreadyFitted { state: self.state.label() });
        }
        if self.results.contains_key(&kind) {
            return Err(ModelError::StrategyAlreadyAttempted { strategy: kind.abbreviation() });
        }
        self.state = FitState::Fitting;

        let mut ctx = FitContext {
            problem: &self.problem,
            rng: &mut self.rng,
            evaluations: &self.evaluations,
            shared: &mut self.shared,
            cache: self.cache.as_deref(),
        };
        let status = match strategy.estimate(&mut ctx) {
            Ok(samples) => {
                let mvn = self.summarize(&samples);
                info!(
                    region = self.region(),
                    strategy = kind.abbreviation(),
                    n_samples = samples.len(),
                    n_raw = samples.raw.len(),
                    skipped = samples.skipped,
                    "strategy.succeeded"
                );
                StrategyStatus::Succeeded(StrategyFit { samples, mvn })
            }
            Err(e) => {
                warn!(
                    region = self.region(),
                    strategy = kind.abbreviation(),
                    error = %e,
                    "strategy.failed"
                );
                StrategyStatus::Failed(e)
            }
        };
        Ok(self.results.entry(kind).or_insert(status))
    }

    /// Mean and covariance of the resampled draws in θ space.
    fn summarize(&self, samples: &WeightedSamples) -> Option<MultivariateNormal> {
        let thetas = samples
            .resampled
            .iter()
            .map(|p| self.problem.codec().to_theta(p))
            .collect::<ModelResult<Vec<_>>>()
            .ok()?;
        MultivariateNormal::fit_to_samples(&thetas).ok()
    }

    /// Close the model for fitting once its results have been reported.
    ///
    /// # Errors
    /// - `NotFitted` when no strategy has run yet.
    pub fn mark_reported(&mut self) -> ModelResult<()> {
        if self.results.is_empty() {
            return Err(ModelError::NotFitted);
        }
        self.state = FitState::Reported;
        Ok(())
    }
}

impl std::fmt::Debug for MovingWindowModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovingWindowModel")
            .field("region", &self.region())
            .field("state", &self.state)
            .field("results", &self.results.keys().collect::<Vec<_>>())
            .field("cached", &self.cache.is_some())
            .finish()
    }
}
