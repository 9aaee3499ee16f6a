use crate::core::models::error::ModelError;
use crate::core::models::model::Model;
use crate::core::models::parameter::Parameter;
use crate::core::models::rate_rule::RateRule;
use crate::core::models::reaction::Reaction;
use crate::core::models::species::Species;
use crate::core::utils::grid::linspace;
use serde::Deserialize;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid model definition: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
}

fn default_stoichiometry() -> u32 {
    1
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SpeciesDefinition {
    pub name: String,
    pub initial_value: f64,
    #[serde(default)]
    pub continuous: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ParameterDefinition {
    pub name: String,
    pub expression: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SpeciesReference {
    pub species: String,
    #[serde(default = "default_stoichiometry")]
    pub stoichiometry: u32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReactionDefinition {
    pub name: String,
    #[serde(default)]
    pub reactants: Vec<SpeciesReference>,
    #[serde(default)]
    pub products: Vec<SpeciesReference>,
    pub rate: Option<String>,
    pub propensity_function: Option<String>,
    pub annotation: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RateRuleDefinition {
    pub species: String,
    pub expression: String,
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TimespanDefinition {
    pub start: f64,
    pub stop: f64,
    pub points: usize,
}

/// A hand-written model, as read from a TOML file.
///
/// ```toml
/// name = "dimerization"
/// volume = 1.0
///
/// [timespan]
/// start = 0.0
/// stop = 100.0
/// points = 101
///
/// [[species]]
/// name = "M"
/// initial-value = 30
///
/// [[parameters]]
/// name = "k_c"
/// expression = "0.005"
///
/// [[reactions]]
/// name = "r_c"
/// rate = "k_c"
/// reactants = [{ species = "M", stoichiometry = 2 }]
/// products = [{ species = "D" }]
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModelDefinition {
    pub name: String,
    pub annotation: Option<String>,
    pub units: Option<String>,
    pub volume: Option<f64>,
    pub timespan: Option<TimespanDefinition>,
    #[serde(default)]
    pub species: Vec<SpeciesDefinition>,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub reactions: Vec<ReactionDefinition>,
    #[serde(default)]
    pub rate_rules: Vec<RateRuleDefinition>,
}

impl ModelDefinition {
    pub fn from_toml_str(content: &str) -> Result<Self, DefinitionError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        debug!("Loading model definition from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Builds the model through its public mutation API.
    ///
    /// Parameters are added but not resolved; [`Model::serialize`] and
    /// [`Model::resolve_parameters`] do that.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Model`] for any entity the model rejects.
    pub fn into_model(self) -> Result<Model, DefinitionError> {
        let mut model = Model::new(self.name);
        if let Some(annotation) = self.annotation {
            model.annotation = annotation;
        }
        if let Some(units) = &self.units {
            model.set_units(units)?;
        }
        if let Some(volume) = self.volume {
            model.set_volume(volume)?;
        }
        if let Some(span) = self.timespan {
            model.timespan(linspace(span.start, span.stop, span.points))?;
        }

        let species = self
            .species
            .into_iter()
            .map(|s| {
                if s.continuous {
                    Species::continuous(s.name, s.initial_value)
                } else {
                    Species::new(s.name, s.initial_value)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        model.add_species(species)?;

        let parameters: Vec<Parameter> = self
            .parameters
            .into_iter()
            .map(|p| Parameter::new(p.name, p.expression))
            .collect();
        model.add_parameter(parameters)?;

        let reactions = self
            .reactions
            .into_iter()
            .map(build_reaction)
            .collect::<Result<Vec<_>, _>>()?;
        model.add_reaction(reactions)?;

        let rules: Vec<RateRule> = self
            .rate_rules
            .into_iter()
            .map(|r| {
                let rule = RateRule::new(r.species, r.expression);
                match r.name {
                    Some(name) => rule.with_name(name),
                    None => rule,
                }
            })
            .collect();
        model.add_rate_rule(rules)?;

        debug!(model = %model.name, "Built model from definition");
        Ok(model)
    }
}

fn build_reaction(definition: ReactionDefinition) -> Result<Reaction, ModelError> {
    let mut builder = Reaction::builder(definition.name);
    for reference in definition.reactants {
        builder = builder.reactant(reference.species, reference.stoichiometry);
    }
    for reference in definition.products {
        builder = builder.product(reference.species, reference.stoichiometry);
    }
    if let Some(rate) = definition.rate {
        builder = builder.rate(rate);
    }
    if let Some(function) = definition.propensity_function {
        builder = builder.propensity_function(function);
    }
    if let Some(annotation) = definition.annotation {
        builder = builder.annotation(annotation);
    }
    Ok(builder.build()?)
}
