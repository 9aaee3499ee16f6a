use crate::core::expression::{self, Namespace};
use crate::core::utils::format::format_number;

/// A named model constant, defined by a formula over other parameters.
///
/// The expression is always present; the value is a memoized evaluation
/// result that stays `None` until an evaluation succeeds. Keeping the value in
/// sync after the expression changes is the owning model's job.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    expression: String,
    value: Option<f64>,
}

impl Parameter {
    /// Creates a parameter and evaluates it once in the empty namespace, so a
    /// scalar literal such as `"0.5"` is resolved immediately.
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        let mut parameter = Self {
            name: name.into(),
            expression: expression.into(),
            value: None,
        };
        parameter.evaluate(&Namespace::new());
        parameter
    }

    /// Creates an already-resolved parameter from a scalar.
    pub fn from_value(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            expression: format_number(value),
            value: Some(value),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Replaces the expression and re-evaluates it in the empty namespace.
    pub fn set_expression(&mut self, expression: impl Into<String>) {
        self.expression = expression.into();
        self.evaluate(&Namespace::new());
    }

    /// Evaluates the expression against `namespace` and memoizes the result.
    ///
    /// Failure is soft: the value becomes `None` and `None` is returned.
    pub fn evaluate(&mut self, namespace: &Namespace) -> Option<f64> {
        self.value = expression::evaluate(&self.expression, namespace).ok();
        self.value
    }

    pub(crate) fn set_value(&mut self, value: f64) {
        self.value = Some(value);
    }
}
