//! # Core Module
//!
//! The data model of a reaction network and everything that operates on it
//! without running a simulation.
//!
//! - **Model Representation** ([`models`]) - species, parameters, reactions, rate rules and the `Model` container
//! - **Formulas** ([`expression`]) - parsing and evaluating propensity and parameter formulas
//! - **Kinetics** ([`kinetics`]) - mass-action propensity derivation and solver-safe name aliasing
//! - **File I/O** ([`io`]) - StochML documents and TOML model definitions
//! - **Utilities** ([`utils`]) - time grids and number formatting

pub mod expression;
pub mod io;
pub mod kinetics;
pub mod models;
pub mod utils;
