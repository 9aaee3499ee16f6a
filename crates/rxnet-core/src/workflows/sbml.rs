use crate::core::models::error::ModelError;
use crate::core::models::model::{Model, Units};
use crate::core::models::parameter::Parameter;
use crate::core::models::rate_rule::RateRule;
use crate::core::models::reaction::Reaction;
use crate::core::models::species::Species;
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Informational note; the model is complete.
pub const SEVERITY_NOTE: i32 = 0;
/// Something was dropped or approximated.
pub const SEVERITY_WARNING: i32 = -5;
/// The document could not be converted.
pub const SEVERITY_ERROR: i32 = -10;

const EMPTY_SET: &str = "EmptySet";

/// A problem reported by the SBML reader before conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderError {
    pub severity: String,
    pub code: u32,
    pub line: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SbmlSpecies {
    pub id: String,
    pub line: u32,
    pub initial_amount: Option<f64>,
    pub initial_concentration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SbmlParameter {
    pub id: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SbmlCompartment {
    pub id: String,
    pub line: u32,
    pub size: f64,
    pub spatial_dimensions: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SbmlSpeciesReference {
    pub species: String,
    pub line: u32,
    pub stoichiometry: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct KineticLaw {
    pub formula: String,
    /// Parameters local to this law.
    pub parameters: Vec<SbmlParameter>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SbmlReaction {
    pub id: String,
    pub line: u32,
    pub reactants: Vec<SbmlSpeciesReference>,
    pub products: Vec<SbmlSpeciesReference>,
    pub kinetic_law: Option<KineticLaw>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Assignment,
    Rate,
    Algebraic,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Assignment => write!(f, "assignment"),
            RuleKind::Rate => write!(f, "rate"),
            RuleKind::Algebraic => write!(f, "algebraic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SbmlRule {
    /// The species, parameter or compartment the rule governs.
    pub variable: String,
    pub kind: RuleKind,
    pub formula: String,
}

/// A constraint, event or function definition: carried only so it can be
/// reported.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SbmlFormulaElement {
    pub id: String,
    pub line: u32,
    pub formula: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SbmlModel {
    pub name: String,
    pub species: Vec<SbmlSpecies>,
    pub parameters: Vec<SbmlParameter>,
    pub compartments: Vec<SbmlCompartment>,
    pub reactions: Vec<SbmlReaction>,
    pub rules: Vec<SbmlRule>,
    pub constraints: Vec<SbmlFormulaElement>,
    pub events: Vec<SbmlFormulaElement>,
    pub function_definitions: Vec<SbmlFormulaElement>,
}

impl SbmlModel {
    fn rule_for(&self, variable: &str) -> Option<&SbmlRule> {
        self.rules.iter().find(|r| r.variable == variable)
    }
}

/// The object graph an SBML reader produces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SbmlDocument {
    pub errors: Vec<ReaderError>,
    pub model: Option<SbmlModel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// `0` note, `-5` approximation, `-10` conversion failure.
    pub severity: i32,
}

/// The outcome of [`convert`].
#[derive(Debug, Clone)]
pub struct Conversion {
    pub model: Option<Model>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// True when any diagnostic has a negative severity.
    pub fn failed(&self) -> bool {
        self.diagnostics
            .iter()
            .map(|d| d.severity)
            .min()
            .is_some_and(|severity| severity < 0)
    }
}

#[derive(Default)]
struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    fn push(&mut self, severity: i32, message: String) {
        if severity < 0 {
            warn!(severity, "{}", message);
        } else {
            debug!(severity, "{}", message);
        }
        self.0.push(Diagnostic { message, severity });
    }
}

/// Converts a parsed SBML document into a model.
///
/// # Arguments
///
/// * `document` - The reader's output: its errors and, if any, the model.
/// * `model_name` - Name for a newly created model; defaults to the SBML model name.
/// * `model` - An existing model to populate instead of a new one.
///
/// # Return
///
/// A [`Conversion`] holding the model and every diagnostic. When the reader
/// reported errors, no model is produced and each error appears with severity
/// [`SEVERITY_ERROR`].
///
/// # Errors
///
/// Returns a [`ModelError`] if an SBML entity violates the model's rules, for
/// example two kinetic laws declaring the same local parameter name.
#[instrument(skip_all)]
pub fn convert(
    document: &SbmlDocument,
    model_name: Option<&str>,
    model: Option<Model>,
) -> Result<Conversion, ModelError> {
    let mut diagnostics = Diagnostics::default();

    for error in &document.errors {
        diagnostics.push(
            SEVERITY_ERROR,
            format!(
                "SBML {}, code {}, line {}: {}",
                error.severity, error.code, error.line, error.message
            ),
        );
    }
    if !document.errors.is_empty() {
        return Ok(Conversion {
            model: None,
            diagnostics: diagnostics.0,
        });
    }

    let Some(source) = &document.model else {
        diagnostics.push(SEVERITY_ERROR, "SBML document contains no model".to_string());
        return Ok(Conversion {
            model: None,
            diagnostics: diagnostics.0,
        });
    };

    let mut model = model.unwrap_or_else(|| Model::new(model_name.unwrap_or(&source.name)));
    model.set_units(&Units::Concentration.to_string())?;

    convert_species(source, &mut model, &mut diagnostics)?;
    convert_parameters(source, &mut model)?;
    convert_reactions(source, &mut model, &mut diagnostics)?;

    for rule in &source.rules {
        if rule.kind != RuleKind::Rate {
            diagnostics.push(
                SEVERITY_NOTE,
                format!(
                    "{} rule for '{}' is imported as a rate rule",
                    capitalize(&rule.kind.to_string()),
                    rule.variable
                ),
            );
        }
        model.add_rate_rule(RateRule::new(rule.variable.as_str(), rule.formula.as_str()))?;
    }

    for compartment in &source.compartments {
        diagnostics.push(
            SEVERITY_WARNING,
            format!(
                "Compartment '{}' found on line '{}' with volume '{}' and dimension '{}'. The model assumes a single well-mixed reaction volume",
                compartment.id, compartment.line, compartment.size, compartment.spatial_dimensions
            ),
        );
    }
    for constraint in &source.constraints {
        diagnostics.push(
            SEVERITY_WARNING,
            format!(
                "Constraint '{}' found on line '{}' with equation '{}'. SBML constraints are not supported",
                constraint.id, constraint.line, constraint.formula
            ),
        );
    }
    for event in &source.events {
        diagnostics.push(
            SEVERITY_WARNING,
            format!(
                "Event '{}' found on line '{}' with trigger equation '{}'. SBML events are not supported",
                event.id, event.line, event.formula
            ),
        );
    }
    for function in &source.function_definitions {
        diagnostics.push(
            SEVERITY_WARNING,
            format!(
                "Function '{}' found on line '{}' with equation '{}'. SBML function definitions are not supported",
                function.id, function.line, function.formula
            ),
        );
    }

    info!(
        model = %model.name,
        species = model.species_count(),
        parameters = model.parameter_count(),
        reactions = model.reaction_count(),
        diagnostics = diagnostics.0.len(),
        "Converted SBML model"
    );
    Ok(Conversion {
        model: Some(model),
        diagnostics: diagnostics.0,
    })
}

fn convert_species(source: &SbmlModel, model: &mut Model, diagnostics: &mut Diagnostics) -> Result<(), ModelError> {
    for species in &source.species {
        if species.id == EMPTY_SET {
            diagnostics.push(
                SEVERITY_NOTE,
                format!(
                    "EmptySet species detected in model on line {}. EmptySet is not an explicit species",
                    species.line
                ),
            );
            continue;
        }

        let mut value = match species.initial_amount.or(species.initial_concentration) {
            Some(value) => value,
            None => {
                let message = match source.rule_for(&species.id) {
                    Some(rule) => format!(
                        "Species '{}' does not have any initial conditions. Associated {} rule found, but rules do not set initial conditions. Assuming initial condition 0",
                        species.id, rule.kind
                    ),
                    None => format!(
                        "Species '{}' does not have any initial conditions or rules. Assuming initial condition 0",
                        species.id
                    ),
                };
                diagnostics.push(SEVERITY_NOTE, message);
                0.0
            }
        };

        if value < 0.0 {
            diagnostics.push(
                SEVERITY_WARNING,
                format!(
                    "Species '{}' has negative initial condition ({}). Negative initial conditions are not supported. Assuming initial condition 0",
                    species.id, value
                ),
            );
            value = 0.0;
        }

        let species = if value.fract() == 0.0 {
            Species::new(species.id.as_str(), value)?
        } else {
            Species::continuous(species.id.as_str(), value)?
        };
        model.add_species(species)?;
    }
    Ok(())
}

fn convert_parameters(source: &SbmlModel, model: &mut Model) -> Result<(), ModelError> {
    for parameter in &source.parameters {
        if source.rule_for(&parameter.id).is_some() {
            model.add_species(Species::continuous(parameter.id.as_str(), parameter.value)?)?;
        } else {
            model.add_parameter(Parameter::from_value(parameter.id.as_str(), parameter.value))?;
        }
    }

    for compartment in &source.compartments {
        model.add_parameter(Parameter::from_value(compartment.id.as_str(), compartment.size))?;
    }

    for reaction in &source.reactions {
        let Some(law) = &reaction.kinetic_law else {
            continue;
        };
        for parameter in &law.parameters {
            model.add_parameter(Parameter::from_value(parameter.id.as_str(), parameter.value))?;
        }
    }
    Ok(())
}

fn convert_reactions(source: &SbmlModel, model: &mut Model, diagnostics: &mut Diagnostics) -> Result<(), ModelError> {
    for reaction in &source.reactions {
        let Some(law) = &reaction.kinetic_law else {
            diagnostics.push(
                SEVERITY_WARNING,
                format!(
                    "Reaction '{}' on line {} has no kinetic law and was skipped",
                    reaction.id, reaction.line
                ),
            );
            continue;
        };

        let mut builder = Reaction::builder(reaction.id.as_str()).propensity_function(law.formula.as_str());
        for reference in &reaction.reactants {
            if let Some(count) = stoichiometry(reaction, reference, "reactant", diagnostics) {
                builder = builder.reactant(reference.species.as_str(), count);
            }
        }
        for reference in &reaction.products {
            if let Some(count) = stoichiometry(reaction, reference, "product", diagnostics) {
                builder = builder.product(reference.species.as_str(), count);
            }
        }
        model.add_reaction(builder.build()?)?;
    }
    Ok(())
}

/// Whole-number stoichiometry for a species reference, or `None` if the
/// reference is skipped.
fn stoichiometry(
    reaction: &SbmlReaction,
    reference: &SbmlSpeciesReference,
    role: &str,
    diagnostics: &mut Diagnostics,
) -> Option<u32> {
    if reference.species == EMPTY_SET {
        diagnostics.push(
            SEVERITY_NOTE,
            format!(
                "EmptySet species detected as {} in reaction '{}' on line {}. EmptySet is not an explicit species",
                role, reaction.id, reference.line
            ),
        );
        return None;
    }

    let rounded = reference.stoichiometry.round();
    if rounded != reference.stoichiometry {
        diagnostics.push(
            SEVERITY_WARNING,
            format!(
                "Stoichiometry {} of {} '{}' in reaction '{}' is not a whole number. Rounded to {}",
                reference.stoichiometry, role, reference.species, reaction.id, rounded
            ),
        );
    }
    if !rounded.is_finite() || rounded < 1.0 || rounded > f64::from(u32::MAX) {
        diagnostics.push(
            SEVERITY_WARNING,
            format!(
                "Stoichiometry {} of {} '{}' in reaction '{}' is not positive. The reference was skipped",
                reference.stoichiometry, role, reference.species, reaction.id
            ),
        );
        return None;
    }
    Some(rounded as u32)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn species(id: &str, amount: Option<f64>) -> SbmlSpecies {
        SbmlSpecies {
            id: id.to_string(),
            initial_amount: amount,
            ..Default::default()
        }
    }

    fn reference(species: &str, stoichiometry: f64) -> SbmlSpeciesReference {
        SbmlSpeciesReference {
            species: species.to_string(),
            stoichiometry,
            ..Default::default()
        }
    }

    fn enzyme_model() -> SbmlModel {
        SbmlModel {
            name: "enzyme".to_string(),
            species: vec![
                species("S", Some(100.0)),
                species("P", Some(0.0)),
                species("EmptySet", None),
            ],
            parameters: vec![SbmlParameter {
                id: "kcat".to_string(),
                value: 0.5,
            }],
            compartments: vec![SbmlCompartment {
                id: "cell".to_string(),
                line: 4,
                size: 1.0,
                spatial_dimensions: 3,
            }],
            reactions: vec![
                SbmlReaction {
                    id: "convert".to_string(),
                    reactants: vec![reference("S", 1.0)],
                    products: vec![reference("P", 1.0)],
                    kinetic_law: Some(KineticLaw {
                        formula: "kcat*S/(Km+S)".to_string(),
                        parameters: vec![SbmlParameter {
                            id: "Km".to_string(),
                            value: 10.0,
                        }],
                    }),
                    ..Default::default()
                },
                SbmlReaction {
                    id: "degrade".to_string(),
                    reactants: vec![reference("P", 1.0)],
                    products: vec![reference("EmptySet", 1.0)],
                    kinetic_law: Some(KineticLaw {
                        formula: "0.1*P".to_string(),
                        parameters: Vec::new(),
                    }),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn reader_errors_prevent_conversion() {
        let document = SbmlDocument {
            errors: vec![ReaderError {
                severity: "Error".to_string(),
                code: 10201,
                line: 12,
                message: "bad math".to_string(),
            }],
            model: Some(enzyme_model()),
        };
        let conversion = convert(&document, None, None).unwrap();
        assert!(conversion.model.is_none());
        assert!(conversion.failed());
        assert_eq!(conversion.diagnostics[0].severity, SEVERITY_ERROR);
        assert_eq!(
            conversion.diagnostics[0].message,
            "SBML Error, code 10201, line 12: bad math"
        );
    }

    #[test]
    fn converts_species_parameters_and_reactions() {
        let document = SbmlDocument {
            errors: Vec::new(),
            model: Some(enzyme_model()),
        };
        let conversion = convert(&document, None, None).unwrap();
        let model = conversion.model.as_ref().unwrap();

        assert_eq!(model.name, "enzyme");
        assert_eq!(model.units(), Units::Concentration);
        assert_eq!(model.species_count(), 2);
        assert!(model.species("EmptySet").is_none());
        assert_eq!(model.parameter("kcat").unwrap().value(), Some(0.5));
        assert_eq!(model.parameter("cell").unwrap().value(), Some(1.0));
        assert_eq!(model.parameter("Km").unwrap().value(), Some(10.0));

        let convert_reaction = model.reaction("convert").unwrap();
        assert!(!convert_reaction.is_mass_action());
        assert_eq!(convert_reaction.propensity_function(), "kcat*S/(Km+S)");
        assert!(model.reaction("degrade").unwrap().products().is_empty());

        // Only the compartment warning is negative.
        let negative: Vec<_> = conversion.diagnostics.iter().filter(|d| d.severity < 0).collect();
        assert_eq!(negative.len(), 1);
        assert!(negative[0].message.contains("Compartment 'cell'"));
        assert!(conversion.failed());
        assert_eq!(
            conversion
                .diagnostics
                .iter()
                .filter(|d| d.message.contains("EmptySet"))
                .count(),
            2
        );
    }

    #[test]
    fn missing_and_negative_initial_conditions_are_defaulted() {
        let source = SbmlModel {
            name: "ic".to_string(),
            species: vec![
                species("A", None),
                species("B", Some(-3.0)),
                SbmlSpecies {
                    id: "C".to_string(),
                    initial_concentration: Some(0.25),
                    ..Default::default()
                },
            ],
            rules: vec![SbmlRule {
                variable: "A".to_string(),
                kind: RuleKind::Assignment,
                formula: "2*C".to_string(),
            }],
            ..Default::default()
        };
        let document = SbmlDocument {
            errors: Vec::new(),
            model: Some(source),
        };
        let conversion = convert(&document, Some("renamed"), None).unwrap();
        let model = conversion.model.as_ref().unwrap();

        assert_eq!(model.name, "renamed");
        assert_eq!(model.species("A").unwrap().initial_value(), 0.0);
        assert_eq!(model.species("B").unwrap().initial_value(), 0.0);
        assert!(model.species("C").unwrap().continuous);
        assert_eq!(model.rate_rule("A").unwrap().expression, "2*C");

        let a_note = conversion
            .diagnostics
            .iter()
            .find(|d| d.message.starts_with("Species 'A'"))
            .unwrap();
        assert_eq!(a_note.severity, SEVERITY_NOTE);
        assert!(a_note.message.contains("assignment rule"));

        let b_warning = conversion
            .diagnostics
            .iter()
            .find(|d| d.message.starts_with("Species 'B'"))
            .unwrap();
        assert_eq!(b_warning.severity, SEVERITY_WARNING);
        assert!(conversion.failed());
    }

    #[test]
    fn rule_target_parameters_become_continuous_species() {
        let source = SbmlModel {
            name: "growth".to_string(),
            parameters: vec![SbmlParameter {
                id: "x".to_string(),
                value: 2.0,
            }],
            rules: vec![SbmlRule {
                variable: "x".to_string(),
                kind: RuleKind::Rate,
                formula: "0.1*x".to_string(),
            }],
            ..Default::default()
        };
        let document = SbmlDocument {
            errors: Vec::new(),
            model: Some(source),
        };
        let conversion = convert(&document, None, Some(Model::new("existing"))).unwrap();
        let model = conversion.model.unwrap();

        assert_eq!(model.name, "existing");
        assert!(model.parameter("x").is_none());
        let x = model.species("x").unwrap();
        assert!(x.continuous);
        assert_eq!(x.initial_value(), 2.0);
        assert_eq!(model.rate_rule("x").unwrap().expression, "0.1*x");
        assert!(conversion.diagnostics.is_empty());
        assert!(!Conversion { model: None, diagnostics: conversion.diagnostics }.failed());
    }

    #[test]
    fn unsupported_elements_and_odd_reactions_are_reported() {
        let element = |id: &str| SbmlFormulaElement {
            id: id.to_string(),
            line: 1,
            formula: "x > 1".to_string(),
        };
        let source = SbmlModel {
            name: "odd".to_string(),
            species: vec![species("A", Some(5.0))],
            reactions: vec![
                SbmlReaction {
                    id: "lawless".to_string(),
                    reactants: vec![reference("A", 1.0)],
                    ..Default::default()
                },
                SbmlReaction {
                    id: "half".to_string(),
                    reactants: vec![reference("A", 1.6)],
                    kinetic_law: Some(KineticLaw {
                        formula: "A".to_string(),
                        parameters: Vec::new(),
                    }),
                    ..Default::default()
                },
            ],
            constraints: vec![element("c1")],
            events: vec![element("e1")],
            function_definitions: vec![element("f1")],
            ..Default::default()
        };
        let document = SbmlDocument {
            errors: Vec::new(),
            model: Some(source),
        };
        let conversion = convert(&document, None, None).unwrap();
        let model = conversion.model.as_ref().unwrap();

        assert!(model.reaction("lawless").is_none());
        assert_eq!(model.reaction("half").unwrap().reactants().get("A"), Some(2));

        let warnings: Vec<&str> = conversion
            .diagnostics
            .iter()
            .filter(|d| d.severity == SEVERITY_WARNING)
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(warnings.len(), 5);
        assert!(warnings.iter().any(|m| m.contains("no kinetic law")));
        assert!(warnings.iter().any(|m| m.contains("Rounded to 2")));
        assert!(warnings.iter().any(|m| m.starts_with("Constraint 'c1'")));
        assert!(warnings.iter().any(|m| m.starts_with("Event 'e1'")));
        assert!(warnings.iter().any(|m| m.starts_with("Function 'f1'")));
    }

    #[test]
    fn duplicate_local_parameters_are_model_errors() {
        let law = || {
            Some(KineticLaw {
                formula: "k*A".to_string(),
                parameters: vec![SbmlParameter {
                    id: "k".to_string(),
                    value: 1.0,
                }],
            })
        };
        let source = SbmlModel {
            name: "dup".to_string(),
            species: vec![species("A", Some(1.0))],
            reactions: vec![
                SbmlReaction {
                    id: "r1".to_string(),
                    reactants: vec![reference("A", 1.0)],
                    kinetic_law: law(),
                    ..Default::default()
                },
                SbmlReaction {
                    id: "r2".to_string(),
                    products: vec![reference("A", 1.0)],
                    kinetic_law: law(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let document = SbmlDocument {
            errors: Vec::new(),
            model: Some(source),
        };
        assert!(matches!(
            convert(&document, None, None),
            Err(ModelError::Naming(_))
        ));
    }

    #[test]
    fn document_without_model_fails() {
        let conversion = convert(&SbmlDocument::default(), None, None).unwrap();
        assert!(conversion.model.is_none());
        assert!(conversion.failed());
    }
}
