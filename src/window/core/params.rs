//! Parameter naming, ordering, and the θ ↔ natural-space codec.
//!
//! Purpose
//! -------
//! Give every estimation strategy one shared vocabulary for parameters:
//! canonical names, a versioned ordering, a named container, and a codec
//! that maps between the unconstrained optimizer vector θ and the
//! natural-space [`ParamVector`].
//!
//! Key behaviors
//! -------------
//! - [`canonical_param_names`] lists the 20 parameters of the two-series
//!   moving-window model, sorted lexicographically.
//! - [`ParamOrder`] assigns positions to names, rejects duplicates, and
//!   carries a version tag for cached artifacts.
//! - [`ParamCodec`] knows which names are logarithmic: for those, θ holds
//!   `ln(x)` and the natural value is `exp(θ)`. All other names pass through.
//!
//! Invariants & assumptions
//! ------------------------
//! - θ and natural space are distinct types ([`Theta`] vs [`ParamVector`]),
//!   so the log transform is applied exactly once, inside the codec.
//! - Decoding uses `safe_exp`, encoding uses `safe_ln`; log parameters are
//!   therefore always strictly positive in natural space.
//!
//! Conventions
//! -----------
//! - Names follow `{series}_{role}` for slopes/intercepts/sigmas and
//!   `day{k}_{series}_multiplier` for day-of-week multipliers, k = 0..6.
//! - The default logarithmic set is every intercept, multiplier, and sigma.
//!   Slopes stay linear.
use crate::optimization::{
    loglik_optimizer::Theta,
    numerical_stability::transformations::{safe_exp, safe_ln},
};
use crate::window::{
    core::series::Series,
    errors::{ModelError, ModelResult},
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Version tag of the canonical ordering; bump when names change.
pub const CANONICAL_ORDER_VERSION: u32 = 1;

/// Days in the day-of-week cycle.
pub const DAYS_PER_WEEK: usize = 7;

/// `{series}_slope`.
pub fn slope_name(series: Series) -> String {
    format!("{}_slope", series.label())
}

/// `{series}_intercept`.
pub fn intercept_name(series: Series) -> String {
    format!("{}_intercept", series.label())
}

/// `sigma_{series}`.
pub fn sigma_name(series: Series) -> String {
    format!("sigma_{}", series.label())
}

/// `day{k}_{series}_multiplier`.
pub fn multiplier_name(day: usize, series: Series) -> String {
    format!("day{}_{}_multiplier", day, series.label())
}

/// The 20 model parameter names, sorted.
pub fn canonical_param_names() -> Vec<String> {
    let mut names = Vec::with_capacity(20);
    for series in Series::ALL {
        names.push(slope_name(series));
        names.push(intercept_name(series));
        names.push(sigma_name(series));
        for day in 0..DAYS_PER_WEEK {
            names.push(multiplier_name(day, series));
        }
    }
    names.sort();
    names
}

/// Intercepts, multipliers, and sigmas.
pub fn default_log_params() -> BTreeSet<String> {
    let mut log = BTreeSet::new();
    for series in Series::ALL {
        log.insert(intercept_name(series));
        log.insert(sigma_name(series));
        for day in 0..DAYS_PER_WEEK {
            log.insert(multiplier_name(day, series));
        }
    }
    log
}

/// `ParamOrder` — versioned mapping from names to vector positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamOrder {
    version: u32,
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ParamOrder {
    /// # Errors
    /// - `DuplicateParamName` when a name repeats.
    pub fn new(version: u32, names: Vec<String>) -> ModelResult<Self> {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(ModelError::DuplicateParamName { name: name.clone() });
            }
        }
        Ok(Self { version, names, index })
    }

    /// Sorted canonical names at [`CANONICAL_ORDER_VERSION`].
    pub fn canonical() -> Self {
        let names = canonical_param_names();
        let index = names.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();
        Self { version: CANONICAL_ORDER_VERSION, names, index }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Like [`index_of`](Self::index_of) but a missing name is an error.
    pub fn position(&self, name: &str) -> ModelResult<usize> {
        self.index_of(name).ok_or_else(|| ModelError::MissingParam { name: name.to_string() })
    }
}

/// Parameters keyed by name, in natural space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    values: BTreeMap<String, f64>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self { values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

/// Natural-space parameter vector laid out by the codec's ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamVector(Array1<f64>);

impl ParamVector {
    pub fn new(values: Array1<f64>) -> Self {
        Self(values)
    }

    pub fn as_array(&self) -> &Array1<f64> {
        &self.0
    }

    pub fn into_inner(self) -> Array1<f64> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> f64 {
        self.0[i]
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

impl From<Vec<f64>> for ParamVector {
    fn from(v: Vec<f64>) -> Self {
        Self(Array1::from(v))
    }
}

/// `ParamCodec` — the single place θ and natural space meet.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamCodec {
    order: ParamOrder,
    log_mask: Vec<bool>,
}

impl ParamCodec {
    /// # Errors
    /// - `UnknownLogParam` when a logarithmic name is not in `order`.
    pub fn new(order: ParamOrder, log_names: &BTreeSet<String>) -> ModelResult<Self> {
        let mut log_mask = vec![false; order.len()];
        for name in log_names {
            let i = order
                .index_of(name)
                .ok_or_else(|| ModelError::UnknownLogParam { name: name.clone() })?;
            log_mask[i] = true;
        }
        Ok(Self { order, log_mask })
    }

    /// Canonical ordering with the default logarithmic set.
    pub fn canonical() -> Self {
        let order = ParamOrder::canonical();
        let log = default_log_params();
        let log_mask = order.names().iter().map(|n| log.contains(n)).collect();
        Self { order, log_mask }
    }

    pub fn order(&self) -> &ParamOrder {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_log(&self, i: usize) -> bool {
        self.log_mask.get(i).copied().unwrap_or(false)
    }

    pub fn is_log_name(&self, name: &str) -> bool {
        self.order.index_of(name).is_some_and(|i| self.log_mask[i])
    }

    /// θ → natural: `exp` on logarithmic entries.
    ///
    /// # Errors
    /// - `ParamLengthMismatch` when `theta` does not match the ordering.
    pub fn to_natural(&self, theta: &Theta) -> ModelResult<ParamVector> {
        self.check_len(theta.len())?;
        let values = Array1::from_shape_fn(theta.len(), |i| {
            if self.log_mask[i] { safe_exp(theta[i]) } else { theta[i] }
        });
        Ok(ParamVector(values))
    }

    /// natural → θ: `ln` on logarithmic entries.
    ///
    /// # Errors
    /// - `ParamLengthMismatch` when `params` does not match the ordering.
    pub fn to_theta(&self, params: &ParamVector) -> ModelResult<Theta> {
        self.check_len(params.len())?;
        let p = params.as_array();
        Ok(Array1::from_shape_fn(p.len(), |i| if self.log_mask[i] { safe_ln(p[i]) } else { p[i] }))
    }

    /// Named natural values → vector in codec order.
    ///
    /// # Errors
    /// - `MissingParam` for any ordering name absent from `named`.
    pub fn to_vector(&self, named: &ParameterSet) -> ModelResult<ParamVector> {
        let values = self
            .order
            .names()
            .iter()
            .map(|n| named.get(n).ok_or_else(|| ModelError::MissingParam { name: n.clone() }))
            .collect::<ModelResult<Vec<f64>>>()?;
        Ok(ParamVector::from(values))
    }

    /// Vector → named natural values.
    ///
    /// With `order = None` the codec's own ordering labels the entries; an
    /// override labels a vector laid out in some other (e.g. per-series)
    /// ordering.
    ///
    /// # Errors
    /// - `ParamLengthMismatch` when the vector and the ordering disagree.
    pub fn to_named(
        &self, params: &ParamVector, order: Option<&ParamOrder>,
    ) -> ModelResult<ParameterSet> {
        let order = order.unwrap_or(&self.order);
        if params.len() != order.len() {
            return Err(ModelError::ParamLengthMismatch {
                expected: order.len(),
                actual: params.len(),
            });
        }
        Ok(order.names().iter().cloned().zip(params.as_array().iter().copied()).collect())
    }

    fn check_len(&self, actual: usize) -> ModelResult<()> {
        if actual != self.len() {
            return Err(ModelError::ParamLengthMismatch { expected: self.len(), actual });
        }
        Ok(())
    }
}
