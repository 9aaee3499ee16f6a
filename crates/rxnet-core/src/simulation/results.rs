use super::solver::SimulationError;
use std::io::Write;

/// One simulated realization: a time axis and one series per label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    time: Vec<f64>,
    series: Vec<(String, Vec<f64>)>,
}

impl Trajectory {
    pub fn new(time: Vec<f64>) -> Self {
        Self {
            time,
            series: Vec::new(),
        }
    }

    /// Adds (or replaces) the series for `label`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::SeriesLength`] if `values` does not match the
    /// time axis.
    pub fn add_series(&mut self, label: impl Into<String>, values: Vec<f64>) -> Result<(), SimulationError> {
        let label = label.into();
        if values.len() != self.time.len() {
            return Err(SimulationError::SeriesLength {
                label,
                expected: self.time.len(),
                found: values.len(),
            });
        }
        match self.series.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = values,
            None => self.series.push((label, values)),
        }
        Ok(())
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn series(&self, label: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, values)| values.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|(label, _)| label.as_str())
    }

    /// Writes a `time,<label>...` header followed by one row per time point.
    pub fn write_csv(&self, writer: impl Write) -> Result<(), SimulationError> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut header = vec!["time"];
        header.extend(self.labels());
        csv.write_record(&header)?;

        for (row, t) in self.time.iter().enumerate() {
            let mut record = Vec::with_capacity(self.series.len() + 1);
            record.push(t.to_string());
            record.extend(self.series.iter().map(|(_, values)| values[row].to_string()));
            csv.write_record(&record)?;
        }
        csv.flush()?;
        Ok(())
    }
}

/// All trajectories produced by one solver run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Results {
    solver: String,
    trajectories: Vec<Trajectory>,
}

impl Results {
    pub fn new(solver: impl Into<String>) -> Self {
        Self {
            solver: solver.into(),
            trajectories: Vec::new(),
        }
    }

    pub fn solver(&self) -> &str {
        &self.solver
    }

    pub fn push(&mut self, trajectory: Trajectory) {
        self.trajectories.push(trajectory);
    }

    pub fn get(&self, index: usize) -> Option<&Trajectory> {
        self.trajectories.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trajectory> {
        self.trajectories.iter()
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }
}
