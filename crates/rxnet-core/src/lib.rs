//! # rxnet Core Library
//!
//! Well-mixed chemical reaction network models: definition, validation,
//! solver-ready formula generation, and exchange through StochML documents.
//!
//! ## Layout
//!
//! - **[`core`]: The Foundation.** The model entity graph (`Model`, `Species`,
//!   `Parameter`, `Reaction`, `RateRule`), the expression evaluator, the
//!   mass-action propensity builder and name sanitizer, and file I/O.
//!
//! - **[`simulation`]: The Solver Contract.** The `Solver` capability through
//!   which a model is simulated, the request a solver receives, and the
//!   trajectories it returns.
//!
//! - **[`workflows`]: Conversions.** Procedures that build a model from another
//!   representation, such as an already-parsed SBML document.

pub mod core;
pub mod simulation;
pub mod workflows;
