//! Penalized window log-likelihood as an optimizer objective.
//!
//! [`WindowObjective`] implements [`LogLikelihood`] over θ with the index
//! selection as data, so the same objective serves the main maximum
//! likelihood fit (both windows) and bootstrap refits (resampled indices).
//! Its value is the data log-likelihood plus the prior log density when the
//! problem carries priors.
//!
//! When a recorder is attached, every successful evaluation lands in the
//! [`EvaluationLog`] as `(θ, objective, log-likelihood)`; the
//! likelihood-surface strategy resamples from that log.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{LogLikelihood, Theta, validation::validate_theta},
};
use crate::window::{
    core::{likelihood::IndexSelection, series::Series},
    models::problem::WindowProblem,
};
use std::cell::RefCell;

/// One recorded objective evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub theta: Theta,
    /// Log-likelihood plus prior.
    pub objective: f64,
    /// Data log-likelihood alone.
    pub log_likelihood: f64,
}

/// Append-only log of objective evaluations for one model.
#[derive(Debug, Default)]
pub struct EvaluationLog {
    entries: RefCell<Vec<Evaluation>>,
}

impl EvaluationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, evaluation: Evaluation) {
        self.entries.borrow_mut().push(evaluation);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Evaluation> {
        self.entries.borrow().clone()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WindowObjective<'a> {
    problem: &'a WindowProblem,
    recorder: Option<&'a EvaluationLog>,
}

impl<'a> WindowObjective<'a> {
    pub fn new(problem: &'a WindowProblem, recorder: Option<&'a EvaluationLog>) -> Self {
        Self { problem, recorder }
    }

    /// Objective and data log-likelihood at θ.
    pub fn evaluate(&self, theta: &Theta, selection: &IndexSelection) -> OptResult<(f64, f64)> {
        let natural = self.problem.codec().to_natural(theta).map_err(|_| {
            OptError::ThetaLengthMismatch { expected: self.problem.codec().len(), actual: theta.len() }
        })?;
        let ll = self.problem.log_likelihood(&natural, Some(selection))?;
        let prior = self.problem.priors().map_or(0.0, |p| p.log_density(theta));
        let total = ll + prior;
        if !total.is_finite() {
            return Err(OptError::NonFiniteCost { value: total });
        }
        Ok((total, ll))
    }
}

impl LogLikelihood for WindowObjective<'_> {
    type Data = IndexSelection;

    fn value(&self, theta: &Theta, data: &IndexSelection) -> OptResult<f64> {
        let (objective, log_likelihood) = self.evaluate(theta, data)?;
        if let Some(log) = self.recorder {
            log.record(Evaluation { theta: theta.clone(), objective, log_likelihood });
        }
        Ok(objective)
    }

    fn check(&self, theta: &Theta, data: &IndexSelection) -> OptResult<()> {
        validate_theta(theta, self.problem.codec().len())?;
        let len = self.problem.series().len();
        for s in Series::ALL {
            let indices = data.get(s);
            if indices.is_empty() {
                return Err(OptError::EmptyIndexSet);
            }
            if let Some(&index) = indices.iter().find(|&&i| i >= len) {
                return Err(OptError::IndexOutOfRange { index, len });
            }
        }
        Ok(())
    }
}
