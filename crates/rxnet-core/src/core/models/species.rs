use super::error::ModelError;
use std::fmt;

/// A chemical species of a well-mixed model.
///
/// Discrete species carry a molecule count and are the default. Continuous
/// species carry a real-valued amount and are typically governed by a
/// [`RateRule`](super::rate_rule::RateRule) rather than by reactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    /// The name by which the species is referenced in reactions and formulas.
    pub name: String,
    /// Initial population (discrete) or amount (continuous). Never negative.
    initial_value: f64,
    /// Whether the species uses concentration rather than population semantics.
    pub continuous: bool,
}

impl Species {
    /// Creates a discrete species.
    ///
    /// The initial value is truncated toward zero to a whole molecule count.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validity`] if `initial_value` is negative or not finite.
    pub fn new(name: impl Into<String>, initial_value: f64) -> Result<Self, ModelError> {
        Self::build(name.into(), initial_value.trunc(), false)
    }

    /// Creates a continuous species whose initial amount is kept as given.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validity`] if `initial_value` is negative or not finite.
    pub fn continuous(name: impl Into<String>, initial_value: f64) -> Result<Self, ModelError> {
        Self::build(name.into(), initial_value, true)
    }

    fn build(name: String, initial_value: f64, continuous: bool) -> Result<Self, ModelError> {
        if !initial_value.is_finite() || initial_value < 0.0 {
            return Err(ModelError::Validity(format!(
                "species '{}' has initial value {}, but initial values must be finite and non-negative",
                name, initial_value
            )));
        }
        Ok(Self {
            name,
            // Truncating -0.5 yields -0.0; store a plain zero.
            initial_value: if initial_value == 0.0 { 0.0 } else { initial_value },
            continuous,
        })
    }

    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discrete_species_truncates_initial_value() {
        let s = Species::new("A", 10.9).unwrap();
        assert_eq!(s.initial_value(), 10.0);
        assert!(!s.continuous);
    }

    #[test]
    fn continuous_species_keeps_real_value() {
        let s = Species::continuous("C", 0.25).unwrap();
        assert_eq!(s.initial_value(), 0.25);
        assert!(s.continuous);
    }

    #[test]
    fn negative_initial_value_is_rejected_with_species_name() {
        let err = Species::new("B", -1.0).unwrap_err();
        assert!(matches!(err, ModelError::Validity(ref msg) if msg.contains("'B'")));
        assert!(Species::continuous("B", f64::NAN).is_err());
    }
}
