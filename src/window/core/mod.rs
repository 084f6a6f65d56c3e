//! Core building blocks for the moving-window model: data, parameters, grid,
//! simulation, likelihood, priors, and options.
//!
//! Everything here is pure and free of logging. The pieces are assembled
//! into a [`WindowProblem`](crate::window::models::problem::WindowProblem)
//! one level up.
pub mod grid;
pub mod likelihood;
pub mod options;
pub mod params;
pub mod priors;
pub mod series;
pub mod simulation;
