use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("Name '{name}' is unavailable. It is reserved for internal use (reserved names: {reserved}).")]
    Reserved { name: String, reserved: String },
    #[error("Names must not be empty.")]
    Empty,
    #[error("Name '{0}' is unavailable. Names must not be numeric strings.")]
    Numeric(String),
    #[error("Name '{name}' is unavailable. Names must not contain special characters: {characters}.")]
    SpecialCharacter { name: String, characters: String },
    #[error("Name '{0}' is unavailable. A species with that name exists.")]
    DuplicateSpecies(String),
    #[error("Name '{0}' is unavailable. A parameter with that name exists.")]
    DuplicateParameter(String),
    #[error("Duplicate name of reaction: '{0}'.")]
    DuplicateReaction(String),
    #[error("Duplicate name of rate rule: '{0}'.")]
    DuplicateRateRule(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReactionError {
    #[error("Reaction '{0}': cannot set the propensity type to mass-action and simultaneously set a propensity function.")]
    BothPropensityModes(String),
    #[error("Reaction '{0}': either a mass-action rate or a propensity function must be specified.")]
    MissingPropensity(String),
    #[error("Reaction '{0}': a reaction must have a non-zero number of reactants or products.")]
    Empty(String),
    #[error("Reaction '{reaction}': a mass-action reaction cannot involve more than two of one species or one of two species (total reactant stoichiometry is {order}).")]
    OrderTooHigh { reaction: String, order: u32 },
    #[error("Reaction '{reaction}': reactant '{species}' must have a positive stoichiometry.")]
    InvalidStoichiometry { reaction: String, species: String },
    #[error("Reaction '{reaction}': mass-action rate '{rate}' is not a parameter of the model.")]
    UnknownRate { reaction: String, rate: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error(transparent)]
    ReactionDefinition(#[from] ReactionError),

    #[error("Could not resolve parameter '{name}' to a scalar value: {reason}")]
    ParameterResolution { name: String, reason: String },

    #[error("Invalid model: {0}")]
    Validity(String),

    #[error("No {kind} named '{name}' in the model")]
    NotFound { kind: &'static str, name: String },
}
