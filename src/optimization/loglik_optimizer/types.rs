//! Numeric aliases and L-BFGS solver types used by the optimizer.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Unconstrained parameters; log-scale entries for positive quantities.
pub type Theta = Array1<f64>;

pub type Grad = Array1<f64>;

pub type Hessian = Array2<f64>;

pub type Cost = f64;

/// argmin's per-function evaluation counters, e.g. `"cost_count"`.
pub type FnEvalMap = HashMap<String, u64>;

/// L-BFGS history length used when [`MLEOptions::lbfgs_mem`](super::MLEOptions) is `None`.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
