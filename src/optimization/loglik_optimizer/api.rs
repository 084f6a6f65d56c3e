//! [`maximize`]: L-BFGS maximization of a [`LogLikelihood`].
//!
//! The solver is built from [`MLEOptions`] (history size, line search,
//! tolerances), run from the caller's starting point, and its final state
//! turned into an [`OptimOutcome`] on the `ℓ` scale.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS,
        },
    },
};
use argmin::{
    core::{Executor, IterState, Solver, State},
    solver::quasinewton::LBFGS,
};

type LbfgsState = IterState<Theta, Grad, (), (), (), Cost>;

/// Maximize `ℓ(θ)` from `theta0`.
///
/// `f.check` runs on the starting point before anything else.
///
/// # Errors
/// The check's error, a rejected tolerance, any failure raised while the
/// solver runs, or a non-finite final estimate.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use epi_window::optimization::{
///     errors::OptResult,
///     loglik_optimizer::{LogLikelihood, MLEOptions, Theta, maximize},
/// };
///
/// struct Bowl;
/// impl LogLikelihood for Bowl {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Bowl, array![0.1, -0.2, 0.3], &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), epi_window::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = with_tolerances(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)?;
            execute(problem, solver, theta0, opts)
        }
        LineSearcher::HagerZhang => {
            let solver = with_tolerances(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)?;
            execute(problem, solver, theta0, opts)
        }
    }
}

/// Apply whichever of the gradient and cost tolerances are set.
fn with_tolerances<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(tol) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(tol)?;
    }
    if let Some(tol) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(tol)?;
    }
    Ok(solver)
}

fn execute<'a, F, S>(
    problem: ArgMinAdapter<'a, F>, solver: S, theta0: Theta, opts: &MLEOptions,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, LbfgsState> + Send + 'static,
{
    let mut executor = Executor::new(problem, solver).configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        executor = executor.add_observer(
            argmin_observer_slog::SlogLogger::term_noblock(),
            argmin::core::observers::ObserverMode::Always,
        );
    }
    if let Some(n) = opts.tols.max_iter {
        executor = executor.configure(|state| state.max_iters(n as u64));
    }

    let mut state = executor.run()?.state().clone();
    let iterations = state.get_iter();
    let fn_evals = state.get_func_counts().clone();
    let termination = state.get_termination_status().clone();
    let grad = state.take_gradient();
    OptimOutcome::new(
        state.take_best_param(),
        -state.get_best_cost(),
        termination,
        iterations,
        fn_evals,
        grad,
    )
}
