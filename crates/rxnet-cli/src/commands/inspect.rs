use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use rxnet::core::io::stochml;
use rxnet::core::models::model::Model;
use std::fmt::{self, Write};
use std::fs;
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    info!("Loading StochML document from {:?}", &args.input);
    let text = fs::read_to_string(&args.input)?;
    let mut model =
        stochml::read_str(&text, args.name.as_deref()).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;
    model.resolve_parameters()?;

    print!("{}", summarize(&model)?);
    Ok(())
}

fn summarize(model: &Model) -> Result<String> {
    let propensities = model
        .sanitized_propensities()
        .map_err(|e| CliError::Other(e.into()))?;
    let mut out = String::new();
    write_summary(&mut out, model, &propensities)
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to format summary: {}", e)))?;
    Ok(out)
}

fn write_summary(out: &mut impl Write, model: &Model, propensities: &[(String, String)]) -> fmt::Result {
    let species_aliases = model.sanitized_species_names();
    let parameter_aliases = model.sanitized_parameter_names();

    let name = if model.name.is_empty() { "<unnamed>" } else { &model.name };
    writeln!(out, "Model: {}", name)?;
    writeln!(out, "  Units:  {}", model.units())?;
    writeln!(out, "  Volume: {}", model.volume())?;

    writeln!(out, "\nSpecies ({}):", model.species_count())?;
    for species in model.species_iter() {
        let kind = if species.continuous { "continuous" } else { "discrete" };
        let alias = species_aliases.get(&species.name).map(String::as_str).unwrap_or("?");
        writeln!(
            out,
            "  {:<16} {:>12}  {:<10} [{}]",
            species.name,
            species.initial_value(),
            kind,
            alias
        )?;
    }

    writeln!(out, "\nParameters ({}):", model.parameter_count())?;
    for parameter in model.parameters_iter() {
        let value = parameter
            .value()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unresolved".to_string());
        let alias = parameter_aliases.get(&parameter.name).map(String::as_str).unwrap_or("?");
        writeln!(
            out,
            "  {:<16} {:>12}  = {} [{}]",
            parameter.name,
            value,
            parameter.expression(),
            alias
        )?;
    }

    writeln!(out, "\nReactions ({}):", model.reaction_count())?;
    for ((name, sanitized), reaction) in propensities.iter().zip(model.reactions_iter()) {
        writeln!(out, "  {} ({})", name, reaction.reaction_type())?;
        writeln!(out, "    propensity: {}", reaction.propensity_function())?;
        writeln!(out, "    sanitized:  {}", sanitized)?;
    }

    if model.rate_rule_count() > 0 {
        writeln!(out, "\nRate rules ({}):", model.rate_rule_count())?;
        for rule in model.rate_rules_iter() {
            writeln!(out, "  d{}/dt = {}", rule.species, rule.expression)?;
        }
    }
    Ok(())
}
