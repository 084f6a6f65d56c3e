//! Model layer: the immutable fit problem, its optimizer objective, and the
//! per-region orchestrator.
pub mod moving_window;
pub mod objective;
pub mod problem;

pub use self::moving_window::{FitState, MovingWindowModel};
pub use self::problem::WindowProblem;
