//! Strategy interface: kinds, results, and the shared fit context.
//!
//! Purpose
//! -------
//! Define what every estimation strategy consumes and produces so the
//! orchestrator can run them uniformly and record their outcomes.
//!
//! Key behaviors
//! -------------
//! - [`StrategyKind`] names a strategy (short abbreviation for report
//!   columns, long name for labels) and parses from either.
//! - [`EstimationStrategy::estimate`] turns a [`FitContext`] into
//!   [`WeightedSamples`] or a [`StrategyError`].
//! - [`FitContext`] gives a strategy the problem, a seeded RNG, the
//!   evaluation log, the optional sample cache, and [`SharedFitState`],
//!   which computes the maximum-likelihood point at most once per model.
//!
//! Invariants & assumptions
//! ------------------------
//! - Sample vectors are natural-space [`ParamVector`]s in the codec's
//!   ordering; `log_probs[i]` belongs to `raw[i]`.
//! - `weights` are unnormalized and aligned with `raw`.
//!
//! Conventions
//! -----------
//! - `log_probs` are the data log-likelihood at the default index selection
//!   (no prior term).
use crate::cache::SampleCache;
use crate::estimation::errors::{StrategyError, StrategyResult};
use crate::inference::mvn::MultivariateNormal;
use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{OptimOutcome, Theta, maximize},
};
use crate::window::{
    core::params::ParamVector,
    models::{
        objective::{EvaluationLog, WindowObjective},
        problem::WindowProblem,
    },
};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The six estimation strategies, declared in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    #[serde(rename = "SM")]
    Regression,
    #[serde(rename = "Hess")]
    Laplace,
    #[serde(rename = "BS")]
    Bootstrap,
    #[serde(rename = "LS")]
    LikelihoodSamples,
    #[serde(rename = "MCMC")]
    RandomWalk,
    #[serde(rename = "PyMC3")]
    Posterior,
}

impl StrategyKind {
    /// Execution order of a full fit.
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Regression,
        StrategyKind::Laplace,
        StrategyKind::Bootstrap,
        StrategyKind::LikelihoodSamples,
        StrategyKind::RandomWalk,
        StrategyKind::Posterior,
    ];

    /// Short label used as the report column prefix.
    pub fn abbreviation(self) -> &'static str {
        match self {
            StrategyKind::Regression => "SM",
            StrategyKind::Laplace => "Hess",
            StrategyKind::Bootstrap => "BS",
            StrategyKind::LikelihoodSamples => "LS",
            StrategyKind::RandomWalk => "MCMC",
            StrategyKind::Posterior => "PyMC3",
        }
    }

    /// Long label used in prediction rows, box summaries, and filenames.
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Regression => "statsmodels",
            StrategyKind::Laplace => "hessian",
            StrategyKind::Bootstrap => "bootstrap",
            StrategyKind::LikelihoodSamples => "likelihood_samples",
            StrategyKind::RandomWalk => "random_walk",
            StrategyKind::Posterior => "PyMC3",
        }
    }

    /// Strategies whose samples come from a Gaussian summary report a
    /// standard-error column.
    pub fn reports_std_err(self) -> bool {
        matches!(self, StrategyKind::Regression | StrategyKind::Laplace | StrategyKind::Posterior)
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    /// Accepts the abbreviation or the long name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StrategyKind::ALL
            .into_iter()
            .find(|k| {
                k.abbreviation().eq_ignore_ascii_case(wanted) || k.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| format!("Unknown strategy: {s}"))
    }
}

/// Parameter samples produced by one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSamples {
    /// `n_samples` draws, already resampled by weight.
    pub resampled: Vec<ParamVector>,
    /// Every candidate the strategy produced.
    pub raw: Vec<ParamVector>,
    /// Unnormalized weight of each raw candidate.
    pub weights: Vec<f64>,
    /// Data log-likelihood of each raw candidate.
    pub log_probs: Vec<f64>,
    /// Attempts discarded along the way (failed replicates, bad draws).
    pub skipped: usize,
}

impl WeightedSamples {
    /// Equal-weight samples where the raw set is the resampled set.
    pub fn uniform(raw: Vec<ParamVector>, log_probs: Vec<f64>) -> Self {
        let weights = vec![1.0; raw.len()];
        Self { resampled: raw.clone(), raw, weights, log_probs, skipped: 0 }
    }

    pub fn len(&self) -> usize {
        self.resampled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resampled.is_empty()
    }
}

/// A successful strategy result with its Gaussian summary in θ space.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyFit {
    pub samples: WeightedSamples,
    /// Mean and covariance of the resampled draws in θ space; `None` when
    /// there were too few draws to fit one.
    pub mvn: Option<MultivariateNormal>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyStatus {
    Succeeded(StrategyFit),
    Failed(StrategyError),
}

impl StrategyStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StrategyStatus::Succeeded(_))
    }

    pub fn fit(&self) -> Option<&StrategyFit> {
        match self {
            StrategyStatus::Succeeded(fit) => Some(fit),
            StrategyStatus::Failed(_) => None,
        }
    }

    pub fn samples(&self) -> Option<&WeightedSamples> {
        self.fit().map(|f| &f.samples)
    }

    pub fn error(&self) -> Option<&StrategyError> {
        match self {
            StrategyStatus::Succeeded(_) => None,
            StrategyStatus::Failed(e) => Some(e),
        }
    }
}

/// Common interface of all estimation strategies.
pub trait EstimationStrategy {
    fn kind(&self) -> StrategyKind;

    /// Produce samples for the model behind `ctx`.
    ///
    /// # Errors
    /// Any [`StrategyError`]; the orchestrator records it and moves on.
    fn estimate(&self, ctx: &mut FitContext<'_>) -> StrategyResult<WeightedSamples>;
}

/// Results shared between strategies of one model.
#[derive(Debug, Clone, Default)]
pub struct SharedFitState {
    mle: Option<Result<OptimOutcome, OptError>>,
    regression_theta: Option<Theta>,
}

impl SharedFitState {
    pub fn mle(&self) -> Option<&Result<OptimOutcome, OptError>> {
        self.mle.as_ref()
    }

    pub fn regression_theta(&self) -> Option<&Theta> {
        self.regression_theta.as_ref()
    }

    pub fn set_regression_theta(&mut self, theta: Theta) {
        self.regression_theta = Some(theta);
    }
}

/// Everything a strategy may touch while it runs.
pub struct FitContext<'a> {
    pub problem: &'a WindowProblem,
    pub rng: &'a mut StdRng,
    pub evaluations: &'a EvaluationLog,
    pub shared: &'a mut SharedFitState,
    pub cache: Option<&'a dyn SampleCache>,
}

impl<'a> FitContext<'a> {
    /// Penalized objective that records each evaluation.
    pub fn objective(&self) -> WindowObjective<'a> {
        WindowObjective::new(self.problem, Some(self.evaluations))
    }

    /// Penalized objective that records nothing.
    pub fn quiet_objective(&self) -> WindowObjective<'a> {
        WindowObjective::new(self.problem, None)
    }

    /// Regression point when available, otherwise the default start.
    pub fn warm_start(&self) -> StrategyResult<Theta> {
        match self.shared.regression_theta() {
            Some(theta) => Ok(theta.clone()),
            None => Ok(self.problem.default_theta()?),
        }
    }

    /// Maximum-likelihood outcome, computed on first request and cached
    /// (success or failure) for the rest of the fit.
    pub fn ensure_mle(&mut self) -> StrategyResult<OptimOutcome> {
        let outcome = match self.shared.mle.take() {
            Some(previous) => previous,
            None => {
                let theta0 = self.warm_start()?;
                let selection = self.problem.default_selection();
                maximize(&self.objective(), theta0, &selection, &self.problem.options().mle_opts)
            }
        };
        self.shared.mle = Some(outcome.clone());
        outcome.map_err(StrategyError::from)
    }
}
