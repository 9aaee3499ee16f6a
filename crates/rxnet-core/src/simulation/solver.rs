use super::results::Results;
use crate::core::models::model::Model;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid timespan: {0}")]
    InvalidTimespan(String),
    #[error("Solver '{solver}' failed: {message}")]
    Solver { solver: String, message: String },
    #[error("Series '{label}' has {found} values but the time axis has {expected}")]
    SeriesLength {
        label: String,
        expected: usize,
        found: usize,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Caller-chosen settings for a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub number_of_trajectories: usize,
    pub seed: Option<u64>,
    pub profile: bool,
    pub debug: bool,
    /// Key series by species name; when off, by species index.
    pub show_labels: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            number_of_trajectories: 1,
            seed: None,
            profile: false,
            debug: false,
            show_labels: true,
        }
    }
}

/// Everything a solver receives besides the model itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    /// Final simulation time.
    pub t: f64,
    /// Output interval.
    pub increment: f64,
    pub seed: Option<u64>,
    pub number_of_trajectories: usize,
    pub profile: bool,
    pub debug: bool,
    pub show_labels: bool,
}

impl RunRequest {
    /// Derives the end time and output step from the last two grid points.
    pub fn from_timespan(tspan: &[f64], options: RunOptions) -> Result<Self, SimulationError> {
        let [.., previous, last] = tspan else {
            return Err(SimulationError::InvalidTimespan(format!(
                "at least two time points are required, found {}",
                tspan.len()
            )));
        };
        Ok(Self {
            t: *last,
            increment: last - previous,
            seed: options.seed,
            number_of_trajectories: options.number_of_trajectories,
            profile: options.profile,
            debug: options.debug,
            show_labels: options.show_labels,
        })
    }

    /// The key a solver should use for the series of species `index`.
    pub fn series_label(&self, index: usize, species: &str) -> String {
        if self.show_labels {
            species.to_string()
        } else {
            index.to_string()
        }
    }
}

/// A simulation algorithm. Implementing this trait is what makes a value
/// acceptable to [`Model::run`].
pub trait Solver {
    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Implementations report algorithm failures as
    /// [`SimulationError::Solver`].
    fn run(&self, model: &Model, request: &RunRequest) -> Result<Results, SimulationError>;
}
