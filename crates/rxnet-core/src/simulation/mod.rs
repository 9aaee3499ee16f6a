//! The simulation capability a model is run through.
//!
//! Simulation algorithms live outside this crate. A solver implements
//! [`Solver`] and is handed the model together with a [`RunRequest`] derived
//! from the model's time grid; it returns [`Results`].

mod results;
mod solver;

pub use results::{Results, Trajectory};
pub use solver::{RunOptions, RunRequest, SimulationError, Solver};
