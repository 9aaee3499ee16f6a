//! # Core Models Module
//!
//! The entity graph of a well-mixed reaction network.
//!
//! ## Key Components
//!
//! - [`species`] - discrete and continuous species with validated initial values
//! - [`parameter`] - named constants defined by formulas, with memoized values
//! - [`reaction`] - reaction channels with mass-action or custom propensities
//! - [`rate_rule`] - derivative rules for continuous species
//! - [`model`] - the `Model` container, its naming rules and mutation API
//! - [`naming`] - reserved names and forbidden characters
//! - [`ids`] - storage keys
//!
//! ## Usage
//!
//! ```ignore
//! use rxnet::core::models::{model::Model, parameter::Parameter, reaction::Reaction, species::Species};
//!
//! let mut model = Model::new("dimerization");
//! model.add_species(vec![Species::new("M", 30.0)?, Species::new("D", 0.0)?])?;
//! model.add_parameter(Parameter::new("k_c", "0.005"))?;
//! model.add_reaction(Reaction::builder("r_c").reactant("M", 2).product("D", 1).rate("k_c").build()?)?;
//! let xml = model.serialize()?;
//! ```

pub(crate) mod collection;
pub mod error;
pub mod ids;
pub mod model;
pub mod naming;
pub mod parameter;
pub mod rate_rule;
pub mod reaction;
pub(crate) mod resolve;
pub mod species;
