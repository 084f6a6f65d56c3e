//! Shared fixtures for the strategy unit tests.
use crate::estimation::traits::{FitContext, SharedFitState};
use crate::window::{
    core::{options::ModelOptions, params::ParamVector, series::RegionSeries},
    models::{objective::EvaluationLog, problem::WindowProblem},
};
use chrono::NaiveDate;
use ndarray::Array1;
use rand::{SeedableRng, rngs::StdRng};

/// Mild growth (slope 0.02), a weekly pattern, and deterministic jitter.
pub(crate) fn realistic_counts(level: f64, n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |i| {
        let growth = (0.02 * i as f64).exp();
        let weekly = 1.0 + 0.1 * ((i % 7) as f64 - 3.0) / 3.0;
        let jitter = 1.0 + 0.04 * (((i * 37) % 11) as f64 - 5.0) / 5.0;
        (level * growth * weekly * jitter).round()
    })
}

/// 30 days of realistic counts for both series under `options`.
pub(crate) fn growing_problem(options: ModelOptions) -> WindowProblem {
    let series = RegionSeries::new(
        "Fixture",
        NaiveDate::from_ymd_opt(2020, 5, 1).expect("date"),
        realistic_counts(200.0, 30),
        realistic_counts(12.0, 30),
        1e6,
        0,
        0,
    )
    .expect("series");
    WindowProblem::new(series, options).expect("problem")
}

/// Owned state behind a [`FitContext`].
pub(crate) struct Harness {
    pub rng: StdRng,
    pub evaluations: EvaluationLog,
    pub shared: SharedFitState,
}

impl Harness {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            evaluations: EvaluationLog::new(),
            shared: SharedFitState::default(),
        }
    }

    pub fn context<'a>(&'a mut self, problem: &'a WindowProblem) -> FitContext<'a> {
        FitContext {
            problem,
            rng: &mut self.rng,
            evaluations: &self.evaluations,
            shared: &mut self.shared,
            cache: None,
        }
    }
}

/// Mean of the named natural-space parameter across `samples`.
pub(crate) fn mean_of(problem: &WindowProblem, samples: &[ParamVector], name: &str) -> f64 {
    let i = problem.codec().order().position(name).expect("name");
    samples.iter().map(|p| p.get(i)).sum::<f64>() / samples.len() as f64
}

/// Natural-space value of `name` at the shared optimum.
pub(crate) fn mle_value(problem: &WindowProblem, shared: &SharedFitState, name: &str) -> f64 {
    let outcome = shared.mle().expect("mle ran").as_ref().expect("mle succeeded");
    let natural = problem.codec().to_natural(&outcome.theta_hat).expect("natural");
    natural.get(problem.codec().order().position(name).expect("name"))
}
