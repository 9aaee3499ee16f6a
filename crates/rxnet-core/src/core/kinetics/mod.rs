//! Reaction kinetics: mass-action propensity construction and the
//! name-sanitizing rewrite that turns user formulas into solver-safe ones.

pub mod propensity;
pub mod sanitize;
