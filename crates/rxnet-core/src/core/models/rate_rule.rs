/// A governing rule for a continuous species: its time derivative (or
/// assignment) written as a formula. Rate rules do not take part in
/// mass-action kinetics.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRule {
    /// Name of the species the rule governs.
    pub species: String,
    pub expression: String,
    pub name: Option<String>,
}

impl RateRule {
    pub fn new(species: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            expression: expression.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
