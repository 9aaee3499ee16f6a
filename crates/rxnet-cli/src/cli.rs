use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The rxnet developers",
    version,
    about = "rxnet CLI - build well-mixed reaction network models and exchange them as StochML documents.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a model from a TOML definition and write it as a StochML document.
    Export(ExportArgs),
    /// Summarize a StochML document, including solver-ready propensities.
    Inspect(InspectArgs),
}

/// Arguments for the `export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to the model definition file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the StochML output. Printed to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override the model volume from the definition file.
    #[arg(long, value_name = "FLOAT")]
    pub volume: Option<f64>,

    /// Override the model units ('population' or 'concentration').
    #[arg(long, value_name = "UNITS")]
    pub units: Option<String>,

    /// Replace a parameter's expression, overriding the definition file.
    /// Can be used multiple times. Example: -S k_c=0.01
    #[arg(short = 'S', long = "set", value_name = "NAME=EXPRESSION", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the StochML document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Name to give the model when the document does not carry one.
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,
}
