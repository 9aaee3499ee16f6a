use super::error::ReactionError;
use crate::core::kinetics::propensity::build_mass_action;
use crate::core::kinetics::sanitize::{SanitizeError, sanitize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// An ordered species → count mapping.
///
/// Order is significant: it fixes the factor order of a derived mass-action
/// propensity and the order of species references in documents. Inserting an
/// existing species replaces its count in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stoichiometry {
    entries: Vec<(String, u32)>,
}

impl Stoichiometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, species: impl Into<String>, count: u32) -> Option<u32> {
        let species = species.into();
        match self.entries.iter_mut().find(|(name, _)| *name == species) {
            Some((_, existing)) => Some(std::mem::replace(existing, count)),
            None => {
                self.entries.push((species, count));
                None
            }
        }
    }

    pub fn get(&self, species: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(name, _)| name == species)
            .map(|(_, count)| *count)
    }

    pub fn contains(&self, species: &str) -> bool {
        self.get(species).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Number of distinct species.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |sum, (_, count)| sum.saturating_add(*count))
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Stoichiometry {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut stoichiometry = Self::new();
        for (species, count) in iter {
            stoichiometry.insert(species, count);
        }
        stoichiometry
    }
}

/// How a reaction's propensity is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Propensity {
    /// Derived from a single rate parameter by the mass-action law.
    MassAction { rate: String, function: String },
    /// An arbitrary user formula.
    Custom(String),
}

impl Propensity {
    pub fn function(&self) -> &str {
        match self {
            Propensity::MassAction { function, .. } => function,
            Propensity::Custom(function) => function,
        }
    }
}

/// The reaction type tag used by the exchange format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionType {
    MassAction,
    Customized,
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReactionType::MassAction => "mass-action",
            ReactionType::Customized => "customized",
        })
    }
}

impl FromStr for ReactionType {
    type Err = ();

    /// Parses `"mass-action"` or `"customized"`, ignoring case and surrounding
    /// whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mass-action" => Ok(ReactionType::MassAction),
            "customized" => Ok(ReactionType::Customized),
            _ => Err(()),
        }
    }
}

/// A single reaction channel.
///
/// Construction goes through [`ReactionBuilder`], which enforces that exactly
/// one propensity mode is chosen, that reactant counts are positive, and that
/// mass-action reactions are at most second order.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub name: String,
    reactants: Stoichiometry,
    products: Stoichiometry,
    propensity: Propensity,
    pub annotation: Option<String>,
}

impl Reaction {
    pub fn builder(name: impl Into<String>) -> ReactionBuilder {
        ReactionBuilder::new(name)
    }

    /// Shorthand for a mass-action reaction with the given rate parameter name.
    pub fn mass_action(
        name: impl Into<String>,
        reactants: Stoichiometry,
        products: Stoichiometry,
        rate: impl Into<String>,
    ) -> Result<Self, ReactionError> {
        ReactionBuilder {
            reactants,
            products,
            ..ReactionBuilder::new(name)
        }
        .rate(rate)
        .build()
    }

    /// Shorthand for a reaction with a custom propensity function.
    pub fn custom(
        name: impl Into<String>,
        reactants: Stoichiometry,
        products: Stoichiometry,
        propensity_function: impl Into<String>,
    ) -> Result<Self, ReactionError> {
        ReactionBuilder {
            reactants,
            products,
            ..ReactionBuilder::new(name)
        }
        .propensity_function(propensity_function)
        .build()
    }

    pub fn reactants(&self) -> &Stoichiometry {
        &self.reactants
    }

    pub fn products(&self) -> &Stoichiometry {
        &self.products
    }

    pub fn propensity(&self) -> &Propensity {
        &self.propensity
    }

    /// The propensity formula, derived or custom.
    pub fn propensity_function(&self) -> &str {
        self.propensity.function()
    }

    pub fn is_mass_action(&self) -> bool {
        matches!(self.propensity, Propensity::MassAction { .. })
    }

    /// Name of the rate parameter of a mass-action reaction.
    pub fn rate(&self) -> Option<&str> {
        match &self.propensity {
            Propensity::MassAction { rate, .. } => Some(rate.as_str()),
            Propensity::Custom(_) => None,
        }
    }

    pub fn reaction_type(&self) -> ReactionType {
        if self.is_mass_action() {
            ReactionType::MassAction
        } else {
            ReactionType::Customized
        }
    }

    /// Checks that the reaction is well formed.
    ///
    /// # Errors
    ///
    /// Fails when no reactant or product is present, or when the propensity
    /// formula (or mass-action rate name) is empty.
    pub fn verify(&self) -> Result<(), ReactionError> {
        let missing = match &self.propensity {
            Propensity::MassAction { rate, .. } => rate.trim().is_empty(),
            Propensity::Custom(function) => function.trim().is_empty(),
        };
        if missing {
            return Err(ReactionError::MissingPropensity(self.name.clone()));
        }
        if self.reactants.is_empty() && self.products.is_empty() {
            return Err(ReactionError::Empty(self.name.clone()));
        }
        Ok(())
    }

    /// Adds (or replaces) a reactant. A mass-action propensity is re-derived,
    /// and the reaction is left untouched if that fails.
    pub fn add_reactant(&mut self, species: impl Into<String>, count: u32) -> Result<(), ReactionError> {
        let species = species.into();
        if count == 0 {
            return Err(ReactionError::InvalidStoichiometry {
                reaction: self.name.clone(),
                species,
            });
        }
        let mut reactants = self.reactants.clone();
        reactants.insert(species, count);
        if let Some(rate) = self.rate().map(str::to_string) {
            let function = derive(&self.name, &reactants, &rate)?;
            self.propensity = Propensity::MassAction { rate, function };
        }
        self.reactants = reactants;
        Ok(())
    }

    /// Adds (or replaces) a product. A count of zero is allowed.
    pub fn add_product(&mut self, species: impl Into<String>, count: u32) {
        self.products.insert(species, count);
    }

    /// The propensity rewritten in terms of solver aliases.
    pub fn sanitized_propensity_function(
        &self,
        species_aliases: &HashMap<String, String>,
        parameter_aliases: &HashMap<String, String>,
    ) -> Result<String, SanitizeError> {
        sanitize(self.propensity_function(), species_aliases, parameter_aliases)
    }
}

fn derive(reaction: &str, reactants: &Stoichiometry, rate: &str) -> Result<String, ReactionError> {
    build_mass_action(reactants, rate).map_err(|e| ReactionError::OrderTooHigh {
        reaction: reaction.to_string(),
        order: e.order,
    })
}

#[derive(Debug, Clone, Default)]
pub struct ReactionBuilder {
    name: String,
    reactants: Stoichiometry,
    products: Stoichiometry,
    rate: Option<String>,
    propensity_function: Option<String>,
    annotation: Option<String>,
}

impl ReactionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn reactant(mut self, species: impl Into<String>, count: u32) -> Self {
        self.reactants.insert(species, count);
        self
    }

    pub fn product(mut self, species: impl Into<String>, count: u32) -> Self {
        self.products.insert(species, count);
        self
    }

    /// Selects mass-action kinetics with the named rate parameter.
    pub fn rate(mut self, rate: impl Into<String>) -> Self {
        self.rate = Some(rate.into());
        self
    }

    pub fn propensity_function(mut self, function: impl Into<String>) -> Self {
        self.propensity_function = Some(function.into());
        self
    }

    pub fn annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn build(self) -> Result<Reaction, ReactionError> {
        if let Some((species, _)) = self.reactants.iter().find(|(_, count)| *count == 0) {
            return Err(ReactionError::InvalidStoichiometry {
                reaction: self.name.clone(),
                species: species.to_string(),
            });
        }

        let propensity = match (self.rate, self.propensity_function) {
            (Some(_), Some(_)) => return Err(ReactionError::BothPropensityModes(self.name)),
            (None, None) => return Err(ReactionError::MissingPropensity(self.name)),
            (Some(rate), None) => {
                let function = derive(&self.name, &self.reactants, &rate)?;
                Propensity::MassAction { rate, function }
            }
            (None, Some(function)) => Propensity::Custom(function),
        };

        let reaction = Reaction {
            name: self.name,
            reactants: self.reactants,
            products: self.products,
            propensity,
            annotation: self.annotation,
        };
        reaction.verify()?;
        Ok(reaction)
    }
}
