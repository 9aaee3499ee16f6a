use crate::cli::ExportArgs;
use crate::error::{CliError, Result};
use rxnet::core::io::definition::{DefinitionError, ModelDefinition};
use rxnet::core::models::model::Model;
use std::path::Path;
use tracing::debug;

/// A model definition file before command-line overrides are applied.
#[derive(Debug)]
pub struct PartialModelConfig {
    definition: ModelDefinition,
}

impl PartialModelConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading model definition from file: {:?}", path);
        let definition = ModelDefinition::from_path(path).map_err(|e| match e {
            DefinitionError::Io(io) => CliError::Io(io),
            other => CliError::FileParsing {
                path: path.to_path_buf(),
                source: other.into(),
            },
        })?;
        Ok(Self { definition })
    }

    /// Applies `--volume`, `--units` and `--set` on top of the file and builds
    /// the model. Command-line values win.
    pub fn merge_with_cli(mut self, args: &ExportArgs) -> Result<Model> {
        if let Some(volume) = args.volume {
            debug!(volume, "Overriding model volume from CLI");
            self.definition.volume = Some(volume);
        }
        if let Some(units) = &args.units {
            debug!(units = %units, "Overriding model units from CLI");
            self.definition.units = Some(units.clone());
        }

        let overrides = parse_set_values(&args.set_values)?;
        let mut model = self.definition.into_model().map_err(|e| match e {
            DefinitionError::Model(model) => CliError::Model(model),
            other => CliError::Config(other.to_string()),
        })?;

        for (name, expression) in overrides {
            debug!(parameter = name, expression, "Overriding parameter from CLI");
            model.set_parameter(name, expression)?;
        }
        Ok(model)
    }
}

fn parse_set_values(set_values: &[String]) -> Result<Vec<(&str, &str)>> {
    set_values
        .iter()
        .map(|kv_pair| match kv_pair.split_once('=') {
            Some((name, expression)) if !name.trim().is_empty() && !expression.trim().is_empty() => {
                Ok((name.trim(), expression.trim()))
            }
            _ => Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected NAME=EXPRESSION.",
                kv_pair
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use once_cell::sync::Lazy;
    use rxnet::core::models::error::ModelError;
    use rxnet::core::models::model::Units;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    const DEFINITION: &str = r#"
name = "birth-death"
units = "population"

[[species]]
name = "A"
initial-value = 10

[[parameters]]
name = "k_birth"
expression = "2"

[[parameters]]
name = "k_death"
expression = "0.1"

[[reactions]]
name = "birth"
rate = "k_birth"
products = [{ species = "A" }]

[[reactions]]
name = "death"
rate = "k_death"
reactants = [{ species = "A" }]
"#;

    fn write_definition(file_name: &str, content: &str) -> PathBuf {
        let path = TEST_DIR.path().join(file_name);
        fs::write(&path, content).unwrap();
        path
    }

    fn export_args(extra: &[&str]) -> ExportArgs {
        let path = write_definition("birth_death.toml", DEFINITION);
        let mut argv = vec!["rxnet", "export", "-i", path.to_str().unwrap()];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Export(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn file_values_are_used_without_overrides() {
        let args = export_args(&[]);
        let model = PartialModelConfig::from_file(&args.input)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();
        assert_eq!(model.name, "birth-death");
        assert_eq!(model.volume(), 1.0);
        assert_eq!(model.units(), Units::Population);
        assert_eq!(model.reaction_count(), 2);
    }

    #[test]
    fn cli_overrides_win() {
        let args = export_args(&["--volume", "4", "--units", "concentration", "-S", "k_death = k_birth/10"]);
        let mut model = PartialModelConfig::from_file(&args.input)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();
        assert_eq!(model.volume(), 4.0);
        assert_eq!(model.units(), Units::Concentration);
        assert_eq!(model.parameter("k_death").unwrap().expression(), "k_birth/10");

        model.resolve_parameters().unwrap();
        assert_eq!(model.parameter("k_death").unwrap().value(), Some(0.2));
    }

    #[test]
    fn set_for_unknown_parameter_fails() {
        let args = export_args(&["-S", "k_other=1"]);
        let result = PartialModelConfig::from_file(&args.input)
            .unwrap()
            .merge_with_cli(&args);
        assert!(matches!(
            result,
            Err(CliError::Model(ModelError::NotFound { .. }))
        ));
    }

    #[test]
    fn malformed_set_value_is_rejected() {
        let args = export_args(&["-S", "k_birth"]);
        let result = PartialModelConfig::from_file(&args.input)
            .unwrap()
            .merge_with_cli(&args);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn invalid_toml_is_a_parsing_error() {
        let path = write_definition("broken.toml", "name = \n");
        assert!(matches!(
            PartialModelConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = TEST_DIR.path().join("does_not_exist.toml");
        assert!(matches!(
            PartialModelConfig::from_file(&path),
            Err(CliError::Io(_))
        ));
    }
}
