//! Priors on θ-space parameters.
//!
//! A [`Prior`] is declared per parameter name and evaluated on θ:
//! - `Normal { mean, sd }` is a normal density on θ itself. For a
//!   logarithmic parameter that is a log-normal prior on the natural value.
//! - `HalfNormal { scale }` is a half-normal density on the natural value
//!   `x = exp(θ)`, plus the Jacobian term `θ` of the log transform.
//!
//! [`Priors::resolve`] binds the declarations to an ordering once, building
//! the `statrs` densities so evaluation in the optimizer loop allocates
//! nothing. Names without a prior contribute nothing.
use crate::optimization::loglik_optimizer::Theta;
use crate::window::{
    core::{
        params::{
            DAYS_PER_WEEK, ParamOrder, intercept_name, multiplier_name, sigma_name, slope_name,
        },
        series::Series,
    },
    errors::{ModelError, ModelResult},
};
use statrs::distribution::{Continuous, Normal};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prior {
    Normal { mean: f64, sd: f64 },
    HalfNormal { scale: f64 },
}

/// Prior declarations keyed by parameter name.
#[derive(Debug, Clone, PartialEq)]
pub struct Priors {
    by_name: BTreeMap<String, Prior>,
}

impl Default for Priors {
    /// `intercept ~ N(10, 5)`, `slope ~ N(0, 0.5)`, every day multiplier
    /// `~ N(0, 0.5)` in log space, `σ ~ HalfNormal(1)`.
    fn default() -> Self {
        let mut by_name = BTreeMap::new();
        for series in Series::ALL {
            by_name.insert(intercept_name(series), Prior::Normal { mean: 10.0, sd: 5.0 });
            by_name.insert(slope_name(series), Prior::Normal { mean: 0.0, sd: 0.5 });
            for day in 0..DAYS_PER_WEEK {
                by_name.insert(multiplier_name(day, series), Prior::Normal { mean: 0.0, sd: 0.5 });
            }
            by_name.insert(sigma_name(series), Prior::HalfNormal { scale: 1.0 });
        }
        Self { by_name }
    }
}

impl Priors {
    /// No priors at all.
    pub fn none() -> Self {
        Self { by_name: BTreeMap::new() }
    }

    pub fn with(mut self, name: impl Into<String>, prior: Prior) -> Self {
        self.by_name.insert(name.into(), prior);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Prior> {
        self.by_name.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Bind to `order`; names not in `order` are ignored.
    ///
    /// # Errors
    /// - `InvalidPrior` when a scale is not finite and positive.
    pub fn resolve(&self, order: &ParamOrder) -> ModelResult<ResolvedPriors> {
        let terms = order
            .names()
            .iter()
            .map(|name| match self.by_name.get(name) {
                None => Ok(None),
                Some(&Prior::Normal { mean, sd }) => Normal::new(mean, sd)
                    .map(|d| Some(ResolvedPrior::Normal(d)))
                    .map_err(|e| ModelError::InvalidPrior { name: name.clone(), reason: e.to_string() }),
                Some(&Prior::HalfNormal { scale }) => Normal::new(0.0, scale)
                    .map(|d| Some(ResolvedPrior::HalfNormal(d)))
                    .map_err(|e| ModelError::InvalidPrior { name: name.clone(), reason: e.to_string() }),
            })
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(ResolvedPriors { terms })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ResolvedPrior {
    Normal(Normal),
    HalfNormal(Normal),
}

/// Priors bound to an ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPriors {
    terms: Vec<Option<ResolvedPrior>>,
}

impl ResolvedPriors {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.iter().all(Option::is_none)
    }

    /// Log prior density at θ (θ laid out by the bound ordering).
    pub fn log_density(&self, theta: &Theta) -> f64 {
        self.terms
            .iter()
            .zip(theta.iter())
            .map(|(term, &t)| match term {
                None => 0.0,
                Some(ResolvedPrior::Normal(d)) => d.ln_pdf(t),
                Some(ResolvedPrior::HalfNormal(d)) => {
                    let x = t.exp();
                    std::f64::consts::LN_2 + d.ln_pdf(x) + t
                }
            })
            .sum()
    }
}
