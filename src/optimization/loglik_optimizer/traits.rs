//! Objective trait, optimizer settings, and the normalized optimizer result.
//!
//! Objectives are written as log-likelihoods `ℓ(θ)` to be maximized. The
//! argmin side only ever sees the cost `−ℓ(θ)`, and the sign flip happens in
//! the adapter, so nothing above this module deals with costs.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{check_count, check_tolerance, validate_theta_hat, validate_value},
    },
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// A log-likelihood over an unconstrained parameter vector.
///
/// `Data` is whatever the objective needs besides `θ`; the window model
/// carries its index selection here, the posterior uses `()`.
///
/// `check` runs once on the starting point before the solver is created.
/// Objectives without an analytic gradient leave `grad` at its default and
/// are differenced numerically.
pub trait LogLikelihood {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Line search used inside L-BFGS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    /// Case-insensitive `"MoreThuente"` or `"HagerZhang"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("morethuente") {
            Ok(LineSearcher::MoreThuente)
        } else if s.eq_ignore_ascii_case("hagerzhang") {
            Ok(LineSearcher::HagerZhang)
        } else {
            Err(OptError::InvalidSetting {
                name: "line_searcher",
                value: s.to_string(),
                reason: "expected MoreThuente or HagerZhang",
            })
        }
    }
}

/// Settings for one maximum-likelihood fit.
///
/// The default (`tol_grad = 1e-6`, `tol_cost = 1e-10`, 300 iterations,
/// More–Thuente) keeps a cost tolerance because the window likelihood is
/// flat along parameters the trailing window does not identify, such as a
/// weekday multiplier for a weekday absent from the window.
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    /// Attach the slog observer; only honored with the `obs_slog` feature.
    pub verbose: bool,
    /// L-BFGS history size; `None` means [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM).
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    /// # Errors
    /// [`OptError::InvalidSetting`] when `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        check_count("lbfgs_mem", lbfgs_mem)?;
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }

    /// Same settings with a different iteration cap, used for bootstrap refits.
    pub fn with_max_iter(&self, max_iter: usize) -> OptResult<Self> {
        let tols = Tolerances::new(self.tols.tol_grad, self.tols.tol_cost, Some(max_iter))?;
        Ok(Self { tols, ..self.clone() })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: Some(1e-10), max_iter: Some(300) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Stopping rules. Each is optional but at least one must be set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// # Errors
    /// [`OptError::NoStoppingRule`] when every rule is `None`, otherwise
    /// [`OptError::InvalidSetting`] for the first unusable value.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoStoppingRule);
        }
        check_tolerance("tol_grad", tol_grad)?;
        check_tolerance("tol_cost", tol_cost)?;
        check_count("max_iter", max_iter)?;
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result of [`maximize`](super::maximize), reported on the `ℓ` scale.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    /// `ℓ(θ̂)`, not the cost.
    pub value: f64,
    /// `false` only when the solver stopped without a termination reason.
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    /// L2 norm of the final cost gradient when the solver kept one.
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// # Errors
    /// Rejects a missing or non-finite `θ̂` and a non-finite `value`.
    pub fn new(
        theta_hat: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat)?;
        validate_value(value)?;
        let converged = !matches!(termination, TerminationStatus::NotTerminated);
        let status = match termination {
            TerminationStatus::NotTerminated => "Not terminated".to_string(),
            TerminationStatus::Terminated(reason) => format!("{reason:?}"),
        };
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm: grad.map(|g| g.l2_norm()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::TerminationReason;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Settings validation and the termination mapping of `OptimOutcome::new`.
    // -------------------------------------------------------------------------

    #[test]
    fn tolerances_require_a_stopping_rule() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoStoppingRule));
        assert!(Tolerances::new(None, None, Some(5)).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Each unusable rule is reported under its own setting name.
    fn tolerances_name_the_rejected_setting() {
        let name_of = |res: OptResult<Tolerances>| match res {
            Err(OptError::InvalidSetting { name, .. }) => Some(name),
            _ => None,
        };
        assert_eq!(name_of(Tolerances::new(Some(-1.0), None, None)), Some("tol_grad"));
        assert_eq!(name_of(Tolerances::new(None, Some(f64::NAN), None)), Some("tol_cost"));
        assert_eq!(name_of(Tolerances::new(None, None, Some(0))), Some("max_iter"));
    }

    #[test]
    fn mle_options_reject_zero_memory() {
        let tols = Tolerances::new(Some(1e-6), None, Some(10)).expect("valid tolerances");
        assert!(matches!(
            MLEOptions::new(tols, LineSearcher::HagerZhang, false, Some(0)),
            Err(OptError::InvalidSetting { name: "lbfgs_mem", .. })
        ));
    }

    #[test]
    fn with_max_iter_changes_only_the_cap() {
        let base = MLEOptions::default();
        let short = base.with_max_iter(25).expect("valid cap");
        assert_eq!(short.tols.max_iter, Some(25));
        assert_eq!(short.tols.tol_grad, base.tols.tol_grad);
        assert_eq!(short.line_searcher, base.line_searcher);
        assert!(base.with_max_iter(0).is_err());
    }

    #[test]
    fn line_searcher_parses_case_insensitively() {
        assert_eq!("hagerZHANG".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert_eq!("MORETHUENTE".parse::<LineSearcher>(), Ok(LineSearcher::MoreThuente));
        assert!("bfgs".parse::<LineSearcher>().is_err());
    }

    #[test]
    // Purpose
    // -------
    // Only `NotTerminated` counts as not converged; the gradient norm is the
    // L2 norm of the final gradient.
    fn outcome_maps_termination_status() {
        let open = OptimOutcome::new(
            Some(array![1.0]),
            -1.0,
            TerminationStatus::NotTerminated,
            3,
            FnEvalMap::new(),
            None,
        )
        .expect("valid outcome");
        assert!(!open.converged);
        assert_eq!(open.grad_norm, None);

        let done = OptimOutcome::new(
            Some(array![1.0]),
            -1.0,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            3,
            FnEvalMap::new(),
            Some(array![3.0, 4.0]),
        )
        .expect("valid outcome");
        assert!(done.converged);
        assert_eq!(done.grad_norm, Some(5.0));
        assert!(
            OptimOutcome::new(None, 0.0, TerminationStatus::NotTerminated, 0, FnEvalMap::new(), None)
                .is_err()
        );
    }
}
