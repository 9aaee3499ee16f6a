//! Arithmetic expressions over named model quantities.
//!
//! Parameter values and propensity functions are written as plain text formulas
//! (`"k1*4"`, `"0.5*k*X*(X-1)/vol"`). This module turns such text into an
//! [`Expression`] once and evaluates it against an explicit [`Namespace`],
//! so nothing in the crate depends on late-bound textual evaluation.
//!
//! Supported syntax: numeric literals (with optional exponent), identifiers,
//! `+ - * /`, power via `^` or `**` (right associative), unary signs,
//! parentheses and a fixed set of builtin functions
//! (`exp`, `log`/`ln`, `log10`, `sqrt`, `abs`, `sin`, `cos`, `tan`, `floor`,
//! `ceil`, `pow`, `min`, `max`).

pub(crate) mod lexer;
mod namespace;
mod parser;

pub use namespace::Namespace;

use parser::{BUILTINS, Node, Parser};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Expression is empty")]
    Empty,
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("Unexpected '{found}' at position {position}")]
    UnexpectedToken { found: String, position: usize },
    #[error("Unexpected end of expression at position {position}")]
    UnexpectedEnd { position: usize },
    #[error("Invalid numeric literal '{0}'")]
    InvalidNumber(String),
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
    #[error("Function '{function}' takes {expected} argument(s), found {found}")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },
    #[error("Name '{0}' is not defined")]
    UnknownName(String),
    #[error("Expression does not evaluate to a finite number")]
    NonFinite,
}

/// A parsed formula together with the text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    /// Parses `text` into an evaluable expression.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] describing the first syntax problem found.
    pub fn parse(text: &str) -> Result<Self, ExpressionError> {
        let tokens = lexer::tokenize(text)?;
        let root = Parser::new(tokens, text.len()).parse()?;
        Ok(Self {
            source: text.to_string(),
            root,
        })
    }

    /// Evaluates the expression with every free name bound from `namespace`.
    ///
    /// # Errors
    ///
    /// Fails with [`ExpressionError::UnknownName`] for an unbound name and with
    /// [`ExpressionError::NonFinite`] when the result is NaN or infinite
    /// (e.g. a division by zero).
    pub fn evaluate(&self, namespace: &Namespace) -> Result<f64, ExpressionError> {
        let value = self.root.evaluate(namespace)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ExpressionError::NonFinite)
        }
    }

    /// The distinct free names referenced by the expression, in order of first
    /// appearance. Function names are not included.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.root.collect_variables(&mut names);
        names
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parses and evaluates `text` in one step.
pub fn evaluate(text: &str, namespace: &Namespace) -> Result<f64, ExpressionError> {
    Expression::parse(text)?.evaluate(namespace)
}

pub fn is_builtin_function(name: &str) -> bool {
    BUILTINS.contains_key(name)
}
