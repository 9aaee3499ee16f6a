use crate::cli::ExportArgs;
use crate::config::PartialModelConfig;
use crate::error::{CliError, Result};
use rxnet::core::io::stochml::StochMlError;
use std::fs;
use tracing::info;

pub fn run(args: ExportArgs) -> Result<()> {
    let partial_config = PartialModelConfig::from_file(&args.input)?;
    info!("Merging model definition with CLI arguments...");
    let mut model = partial_config.merge_with_cli(&args)?;

    info!(
        model = %model.name,
        species = model.species_count(),
        parameters = model.parameter_count(),
        reactions = model.reaction_count(),
        "Serializing model to StochML"
    );
    let document = model.serialize().map_err(|e| match e {
        StochMlError::Model(model) => CliError::Model(model),
        other => CliError::Other(other.into()),
    })?;

    match &args.output {
        Some(path) => {
            fs::write(path, &document)?;
            info!("StochML document written to {:?}", path);
            println!("✓ Model '{}' written to: {}", model.name, path.display());
        }
        None => print!("{}", document),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use rxnet::core::io::stochml::StochMlFile;
    use rxnet::core::io::traits::ModelFile;
    use rxnet::core::models::error::ModelError;
    use tempfile::tempdir;

    fn export_args(argv: &[&str]) -> ExportArgs {
        let mut full = vec!["rxnet", "export"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Export(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn exported_document_reads_back() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("decay.toml");
        let output = dir.path().join("decay.xml");
        fs::write(
            &input,
            r#"
name = "decay"

[[species]]
name = "A"
initial-value = 100

[[parameters]]
name = "k"
expression = "0.5*2"

[[reactions]]
name = "r1"
rate = "k"
reactants = [{ species = "A" }]
"#,
        )
        .unwrap();

        run(export_args(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]))
        .unwrap();

        let mut model = StochMlFile::read_from_path(&output).unwrap();
        model.resolve_parameters().unwrap();
        assert_eq!(model.species("A").unwrap().initial_value(), 100.0);
        assert_eq!(model.parameter("k").unwrap().value(), Some(1.0));
        assert_eq!(model.reaction("r1").unwrap().rate(), Some("k"));
    }

    #[test]
    fn unresolvable_parameter_fails_export() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("broken.toml");
        fs::write(
            &input,
            r#"
name = "broken"

[[parameters]]
name = "k"
expression = "missing*2"
"#,
        )
        .unwrap();

        let result = run(export_args(&["-i", input.to_str().unwrap()]));
        assert!(matches!(
            result,
            Err(CliError::Model(ModelError::ParameterResolution { .. }))
        ));
    }
}
