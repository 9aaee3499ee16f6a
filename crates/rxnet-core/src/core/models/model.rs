use super::collection::NamedCollection;
use super::error::{ModelError, NamingError, ReactionError};
use super::ids::{ParameterId, RateRuleId, ReactionId, SpeciesId};
use super::naming::check_name_syntax;
use super::parameter::Parameter;
use super::rate_rule::RateRule;
use super::reaction::Reaction;
use super::resolve::resolve_in_order;
use super::species::Species;
use crate::core::expression::Namespace;
use crate::core::io::stochml::{self, StochMlError};
use crate::core::kinetics::sanitize::{SanitizeError, parameter_aliases, species_aliases};
use crate::core::utils::grid::{linspace, uniform_step};
use crate::simulation::{Results, RunOptions, RunRequest, SimulationError, Solver};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_ANNOTATION: &str = "model";
pub const DEFAULT_VOLUME: f64 = 1.0;
const DEFAULT_TSPAN_END: f64 = 20.0;
const DEFAULT_TSPAN_POINTS: usize = 401;
const VOLUME_NAME: &str = "vol";

/// How species amounts are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Population,
    Concentration,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Population => write!(f, "population"),
            Units::Concentration => write!(f, "concentration"),
        }
    }
}

impl FromStr for Units {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "population" => Ok(Units::Population),
            "concentration" => Ok(Units::Concentration),
            _ => Err(ModelError::Validity(format!(
                "units must be either 'population' or 'concentration', got '{}'",
                s
            ))),
        }
    }
}

/// One entity or a batch of entities handed to an `add_*` method.
#[derive(Debug, Clone, PartialEq)]
pub enum Entities<T> {
    Single(T),
    Many(Vec<T>),
}

impl<T> Entities<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Entities::Single(item) => vec![item],
            Entities::Many(items) => items,
        }
    }
}

macro_rules! impl_entities_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Entities<$ty> {
                fn from(item: $ty) -> Self {
                    Entities::Single(item)
                }
            }

            impl From<Vec<$ty>> for Entities<$ty> {
                fn from(items: Vec<$ty>) -> Self {
                    Entities::Many(items)
                }
            }
        )*
    };
}

impl_entities_from!(Species, Parameter, Reaction, RateRule);

/// A well-mixed reaction network.
///
/// The model owns its species, parameters, reactions and rate rules in
/// insertion order and keeps every name unique across species and parameters.
/// Parameter values are not kept up to date automatically; call
/// [`Model::resolve_parameters`] after editing expressions.
///
/// Deleting an entity never removes the entities that refer to it. A caller
/// deleting a species or parameter is responsible for deleting the reactions
/// and rate rules that mention it.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub annotation: String,
    species: NamedCollection<SpeciesId, Species>,
    parameters: NamedCollection<ParameterId, Parameter>,
    reactions: NamedCollection<ReactionId, Reaction>,
    rate_rules: NamedCollection<RateRuleId, RateRule>,
    volume: f64,
    units: Units,
    tspan: Vec<f64>,
}

impl Model {
    /// Creates an empty population model with unit volume and the default
    /// time grid of 401 points over `[0, 20]`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: DEFAULT_ANNOTATION.to_string(),
            species: NamedCollection::default(),
            parameters: NamedCollection::default(),
            reactions: NamedCollection::default(),
            rate_rules: NamedCollection::default(),
            volume: DEFAULT_VOLUME,
            units: Units::Population,
            tspan: linspace(0.0, DEFAULT_TSPAN_END, DEFAULT_TSPAN_POINTS),
        }
    }

    // Naming

    fn check_name(&self, name: &str) -> Result<(), NamingError> {
        check_name_syntax(name)?;
        if self.species.contains(name) {
            return Err(NamingError::DuplicateSpecies(name.to_string()));
        }
        if self.parameters.contains(name) {
            return Err(NamingError::DuplicateParameter(name.to_string()));
        }
        Ok(())
    }

    // Species

    /// Adds one or more species.
    ///
    /// # Arguments
    ///
    /// * `species` - A single [`Species`] or a `Vec` of them.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Naming`] if any name violates the naming rules,
    /// collides with an existing species or parameter, or repeats within the
    /// batch. Nothing is added when an error is returned.
    pub fn add_species(&mut self, species: impl Into<Entities<Species>>) -> Result<(), ModelError> {
        let batch = species.into().into_vec();

        let mut seen = HashSet::new();
        for item in &batch {
            self.check_name(&item.name)?;
            if !seen.insert(item.name.as_str()) {
                return Err(NamingError::DuplicateSpecies(item.name.clone()).into());
            }
        }

        for item in batch {
            debug!(model = %self.name, species = %item.name, initial_value = item.initial_value(), "Adding species");
            self.species.insert(item.name.clone(), item);
        }
        Ok(())
    }

    pub fn species(&self, name: &str) -> Option<&Species> {
        self.species.get(name)
    }

    /// Returns the species in insertion order.
    pub fn species_iter(&self) -> impl Iterator<Item = &Species> {
        self.species.iter()
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    /// Removes a species. Reactions and rate rules that refer to it are kept.
    pub fn delete_species(&mut self, name: &str) -> Option<Species> {
        let removed = self.species.remove(name);
        if removed.is_some() {
            debug!(model = %self.name, species = name, "Deleted species");
        }
        removed
    }

    pub fn delete_all_species(&mut self) {
        self.species.clear();
    }

    // Parameters

    /// Adds one or more parameters.
    ///
    /// Values are not re-resolved; a parameter whose expression refers to
    /// other parameters stays unresolved until [`Model::resolve_parameters`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Naming`] under the same rules as
    /// [`Model::add_species`]. Nothing is added when an error is returned.
    pub fn add_parameter(&mut self, parameters: impl Into<Entities<Parameter>>) -> Result<(), ModelError> {
        let batch = parameters.into().into_vec();

        let mut seen = HashSet::new();
        for item in &batch {
            self.check_name(&item.name)?;
            if !seen.insert(item.name.as_str()) {
                return Err(NamingError::DuplicateParameter(item.name.clone()).into());
            }
        }

        for item in batch {
            debug!(model = %self.name, parameter = %item.name, expression = item.expression(), "Adding parameter");
            self.parameters.insert(item.name.clone(), item);
        }
        Ok(())
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Returns the parameters in insertion order.
    pub fn parameters_iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Replaces a parameter's expression and evaluates it in the empty
    /// namespace.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if no parameter has this name.
    pub fn set_parameter(&mut self, name: &str, expression: impl Into<String>) -> Result<(), ModelError> {
        let parameter = self.parameters.get_mut(name).ok_or_else(|| ModelError::NotFound {
            kind: "parameter",
            name: name.to_string(),
        })?;
        parameter.set_expression(expression);
        debug!(model = %self.name, parameter = name, expression = parameter.expression(), "Updated parameter");
        Ok(())
    }

    /// Removes a parameter. Reactions that use it as a rate are kept.
    pub fn delete_parameter(&mut self, name: &str) -> Option<Parameter> {
        let removed = self.parameters.remove(name);
        if removed.is_some() {
            debug!(model = %self.name, parameter = name, "Deleted parameter");
        }
        removed
    }

    pub fn delete_all_parameters(&mut self) {
        self.parameters.clear();
    }

    // Reactions

    /// Adds one or more reactions.
    ///
    /// # Errors
    ///
    /// - [`ModelError::ReactionDefinition`] if a reaction fails
    ///   [`Reaction::verify`] or uses a mass-action rate that is not a
    ///   parameter of this model.
    /// - [`ModelError::Naming`] if a name is malformed or already used by
    ///   another reaction (in the model or in the batch).
    ///
    /// Nothing is added when an error is returned.
    pub fn add_reaction(&mut self, reactions: impl Into<Entities<Reaction>>) -> Result<(), ModelError> {
        let batch = reactions.into().into_vec();

        let mut seen = HashSet::new();
        for reaction in &batch {
            check_name_syntax(&reaction.name)?;
            reaction.verify()?;
            if self.reactions.contains(&reaction.name) || !seen.insert(reaction.name.as_str()) {
                return Err(NamingError::DuplicateReaction(reaction.name.clone()).into());
            }
            if let Some(rate) = reaction.rate() {
                if !self.parameters.contains(rate) {
                    return Err(ReactionError::UnknownRate {
                        reaction: reaction.name.clone(),
                        rate: rate.to_string(),
                    }
                    .into());
                }
            }
        }

        for reaction in batch {
            debug!(
                model = %self.name,
                reaction = %reaction.name,
                propensity = reaction.propensity_function(),
                "Adding reaction"
            );
            self.reactions.insert(reaction.name.clone(), reaction);
        }
        Ok(())
    }

    pub fn reaction(&self, name: &str) -> Option<&Reaction> {
        self.reactions.get(name)
    }

    /// Returns the reactions in insertion order.
    pub fn reactions_iter(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.iter()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    pub fn delete_reaction(&mut self, name: &str) -> Option<Reaction> {
        let removed = self.reactions.remove(name);
        if removed.is_some() {
            debug!(model = %self.name, reaction = name, "Deleted reaction");
        }
        removed
    }

    pub fn delete_all_reactions(&mut self) {
        self.reactions.clear();
    }

    // Rate rules

    /// Adds one or more rate rules, keyed by the species they govern.
    ///
    /// A rule for a species that already has one replaces it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Naming`] if a rule's optional name violates the
    /// naming rules or is already used by another rule (in the model or in the
    /// batch). The rule being replaced does not count. Nothing is added when an
    /// error is returned.
    pub fn add_rate_rule(&mut self, rules: impl Into<Entities<RateRule>>) -> Result<(), ModelError> {
        let batch = rules.into().into_vec();

        let mut seen = HashSet::new();
        for rule in &batch {
            let Some(name) = &rule.name else {
                continue;
            };
            self.check_name(name)?;
            let taken = self
                .rate_rules
                .iter()
                .any(|r| r.species != rule.species && r.name.as_deref() == Some(name.as_str()));
            if taken || !seen.insert(name.as_str()) {
                return Err(NamingError::DuplicateRateRule(name.clone()).into());
            }
        }

        for rule in batch {
            let species = rule.species.clone();
            match self.rate_rules.insert(species.clone(), rule) {
                Some(previous) => warn!(
                    model = %self.name,
                    species = %species,
                    replaced = %previous.expression,
                    "Replaced existing rate rule"
                ),
                None => debug!(model = %self.name, species = %species, "Adding rate rule"),
            }
        }
        Ok(())
    }

    /// Returns the rate rule governing `species`, if any.
    pub fn rate_rule(&self, species: &str) -> Option<&RateRule> {
        self.rate_rules.get(species)
    }

    pub fn rate_rules_iter(&self) -> impl Iterator<Item = &RateRule> {
        self.rate_rules.iter()
    }

    pub fn rate_rule_count(&self) -> usize {
        self.rate_rules.len()
    }

    pub fn delete_rate_rule(&mut self, species: &str) -> Option<RateRule> {
        self.rate_rules.remove(species)
    }

    pub fn delete_all_rate_rules(&mut self) {
        self.rate_rules.clear();
    }

    // Settings

    pub fn units(&self) -> Units {
        self.units
    }

    /// Sets the units from text, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validity`] unless `units` is `population` or
    /// `concentration`.
    pub fn set_units(&mut self, units: &str) -> Result<(), ModelError> {
        self.units = units.parse()?;
        self.check_volume_units();
        Ok(())
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// # Errors
    ///
    /// Returns [`ModelError::Validity`] if `volume` is not a positive finite
    /// number.
    pub fn set_volume(&mut self, volume: f64) -> Result<(), ModelError> {
        if !volume.is_finite() || volume <= 0.0 {
            return Err(ModelError::Validity(format!(
                "volume must be a positive finite number, got {}",
                volume
            )));
        }
        self.volume = volume;
        self.check_volume_units();
        Ok(())
    }

    fn check_volume_units(&self) {
        if self.units == Units::Concentration && self.volume != DEFAULT_VOLUME {
            warn!(
                model = %self.name,
                volume = self.volume,
                "Concentration models are interpreted at unit volume; the volume has no effect on concentrations"
            );
        }
    }

    /// Sets the simulation time grid.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validity`] if the grid has fewer than two points,
    /// is not uniform (successive differences compared after rounding to 10
    /// decimal places), or does not increase.
    pub fn timespan(&mut self, points: Vec<f64>) -> Result<(), ModelError> {
        if points.len() < 2 {
            return Err(ModelError::Validity(
                "timespan must contain at least two points".to_string(),
            ));
        }
        match uniform_step(&points) {
            Some(step) if step > 0.0 => {
                self.tspan = points;
                Ok(())
            }
            Some(_) => Err(ModelError::Validity("timespan must be increasing".to_string())),
            None => Err(ModelError::Validity(
                "timespan must be uniformly spaced".to_string(),
            )),
        }
    }

    pub fn tspan(&self) -> &[f64] {
        &self.tspan
    }

    // Evaluation

    /// The current evaluation environment: the model volume as `vol` plus
    /// every parameter that has a value.
    pub fn namespace(&self) -> Namespace {
        let mut namespace = Namespace::new();
        namespace.insert(VOLUME_NAME, self.volume);
        for parameter in self.parameters.iter() {
            if let Some(value) = parameter.value() {
                namespace.insert(parameter.name.as_str(), value);
            }
        }
        namespace
    }

    /// Re-evaluates every parameter, in dependency order.
    ///
    /// Parameter expressions may refer to other parameters regardless of the
    /// order they were added in, and to `vol`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ParameterResolution`] naming the offending
    /// parameter on a syntax error, an undefined reference, a reference cycle,
    /// or a non-finite value. Parameter values are unchanged on error.
    #[instrument(skip_all, fields(model = %self.name))]
    pub fn resolve_parameters(&mut self) -> Result<(), ModelError> {
        let mut base = Namespace::new();
        base.insert(VOLUME_NAME, self.volume);

        let resolved = resolve_in_order(self.parameters.iter(), &base)?;

        let names: Vec<String> = self.parameters.iter().map(|p| p.name.clone()).collect();
        for name in names {
            if let (Some(value), Some(parameter)) = (resolved.get(&name), self.parameters.get_mut(&name)) {
                parameter.set_value(value);
            }
        }
        debug!(count = self.parameters.len(), "Resolved parameters");
        Ok(())
    }

    /// Species name → `S[i]` alias, in species order.
    pub fn sanitized_species_names(&self) -> HashMap<String, String> {
        species_aliases(self.species.iter().map(|s| s.name.as_str()))
    }

    /// Parameter name → `P{i}` alias, in parameter order, with `vol` → `V`.
    pub fn sanitized_parameter_names(&self) -> HashMap<String, String> {
        parameter_aliases(self.parameters.iter().map(|p| p.name.as_str()))
    }

    /// Every reaction's propensity rewritten in terms of solver aliases, as
    /// `(reaction name, formula)` pairs in reaction order.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::UnknownName`] if a propensity references a
    /// name that is neither a species nor a parameter of this model.
    pub fn sanitized_propensities(&self) -> Result<Vec<(String, String)>, SanitizeError> {
        let species = self.sanitized_species_names();
        let parameters = self.sanitized_parameter_names();
        self.reactions
            .iter()
            .map(|r| {
                r.sanitized_propensity_function(&species, &parameters)
                    .map(|f| (r.name.clone(), f))
            })
            .collect()
    }

    /// Simulates the model with `solver` over the model's time grid.
    ///
    /// The solver receives the final time and the grid step derived from
    /// [`Model::tspan`] together with `options`.
    pub fn run(&self, solver: &dyn Solver, options: RunOptions) -> Result<Results, SimulationError> {
        let request = RunRequest::from_timespan(&self.tspan, options)?;
        info!(
            model = %self.name,
            solver = solver.name(),
            t = request.t,
            increment = request.increment,
            trajectories = request.number_of_trajectories,
            "Running simulation"
        );
        solver.run(self, &request)
    }

    /// Resolves all parameters and renders the model as a StochML document.
    pub fn serialize(&mut self) -> Result<String, StochMlError> {
        self.resolve_parameters()?;
        stochml::write_string(self)
    }
}
