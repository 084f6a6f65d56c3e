//! Errors raised while scoring or maximizing a window log-likelihood.
//!
//! Failures from inside argmin arrive boxed in `argmin::core::Error`. Our own
//! variants travel through that box unchanged and are recovered by the
//! `From` impl below; anything argmin raised itself becomes
//! [`OptError::Solver`] with argmin's message.
use argmin::core::Error;

pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Objective ----
    /// The objective has no analytic gradient; finite differences are used.
    GradientNotImplemented,
    NonFiniteCost {
        value: f64,
    },
    /// The curve simulation refused a parameter vector.
    RejectedParameters {
        text: String,
    },

    // ---- Derivatives ----
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },
    InvalidGradient {
        index: usize,
        value: f64,
    },
    HessianDimMismatch {
        expected: usize,
        found: (usize, usize),
    },
    InvalidHessian {
        row: usize,
        col: usize,
        value: f64,
    },

    // ---- Optimizer settings ----
    /// A tolerance, iteration cap, memory size, or line-search name is unusable.
    InvalidSetting {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
    /// Gradient tolerance, cost tolerance, and iteration cap were all absent.
    NoStoppingRule,

    // ---- Solution ----
    InvalidThetaHat {
        index: usize,
        value: f64,
    },
    MissingThetaHat,

    // ---- Window likelihood ----
    ThetaLengthMismatch {
        expected: usize,
        actual: usize,
    },
    InvalidThetaInput {
        index: usize,
        value: f64,
    },
    /// A selected likelihood index falls outside the observed series.
    IndexOutOfRange {
        index: usize,
        len: usize,
    },
    /// `count + log_offset` must be strictly positive before taking logs.
    NonPositiveLogArgument {
        index: usize,
        value: f64,
    },
    EmptyIndexSet,
    /// A count or curve buffer was not laid out contiguously.
    NonContiguousSeries,

    // ---- Solver ----
    /// Failure reported by argmin itself.
    Solver {
        text: String,
    },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptError::GradientNotImplemented => write!(f, "No analytic gradient available"),
            OptError::NonFiniteCost { value } => {
                write!(f, "Log-likelihood evaluated to a non-finite value ({value})")
            }
            OptError::RejectedParameters { text } => {
                write!(f, "Parameters rejected by the curve simulation: {text}")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient has {found} entries, expected {expected}")
            }
            OptError::InvalidGradient { index, value } => {
                write!(f, "Gradient entry {index} is {value}; entries must be finite")
            }
            OptError::HessianDimMismatch { expected, found } => {
                write!(f, "Hessian is {}x{}, expected {expected}x{expected}", found.0, found.1)
            }
            OptError::InvalidHessian { row, col, value } => {
                write!(f, "Hessian entry ({row}, {col}) is {value}; entries must be finite")
            }
            OptError::InvalidSetting { name, value, reason } => {
                write!(f, "Optimizer setting {name} = {value} rejected: {reason}")
            }
            OptError::NoStoppingRule => {
                write!(f, "Optimizer needs a gradient tolerance, cost tolerance, or iteration cap")
            }
            OptError::InvalidThetaHat { index, value } => {
                write!(f, "Optimizer returned non-finite estimate {value} at index {index}")
            }
            OptError::MissingThetaHat => write!(f, "Optimizer returned no parameter estimate"),
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Parameter vector has {actual} entries, expected {expected}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Parameter entry {index} is {value}; entries must be finite")
            }
            OptError::IndexOutOfRange { index, len } => {
                write!(f, "Likelihood index {index} is out of range for a series of length {len}")
            }
            OptError::NonPositiveLogArgument { index, value } => {
                write!(f, "Log argument at index {index} is {value}; counts plus offset must be > 0")
            }
            OptError::EmptyIndexSet => write!(f, "Likelihood index set is empty"),
            OptError::NonContiguousSeries => write!(f, "Series buffer is not contiguous"),
            OptError::Solver { text } => write!(f, "Solver failed: {text}"),
        }
    }
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        match err.downcast::<OptError>() {
            Ok(own) => own,
            Err(other) => OptError::Solver { text: other.to_string() },
        }
    }
}
