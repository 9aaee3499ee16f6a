//! # Workflows Module
//!
//! Procedures that produce a [`Model`](crate::core::models::model::Model)
//! from another representation using only the model's public mutation API.
//!
//! - **SBML Conversion** ([`sbml`]) - builds a concentration model from an
//!   already-parsed SBML document and reports what could not be carried over.

pub mod sbml;
