//! Reading and writing models.
//!
//! [`stochml`] is the XML exchange format understood by StochKit-style
//! solvers; it implements the [`traits::ModelFile`] interface. [`definition`]
//! loads hand-written TOML model definitions.

pub mod definition;
pub mod stochml;
pub mod traits;
