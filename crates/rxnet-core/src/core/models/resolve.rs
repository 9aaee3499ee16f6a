use super::error::ModelError;
use super::parameter::Parameter;
use crate::core::expression::{Expression, Namespace};
use std::collections::HashSet;

struct Pending<'a> {
    name: &'a str,
    expression: Expression,
    dependencies: Vec<String>,
}

/// Evaluates every parameter in dependency order.
///
/// `base` holds names that are bound independently of the parameters (the
/// model volume). The returned namespace contains `base` plus one entry per
/// parameter. Among parameters whose dependencies are satisfied, collection
/// order decides which is evaluated first, so the result is deterministic.
///
/// # Errors
///
/// Returns [`ModelError::ParameterResolution`] naming the first parameter that
/// fails to parse, references an undefined name, takes part in a reference
/// cycle, or evaluates to a non-finite value.
pub(crate) fn resolve_in_order<'a>(
    parameters: impl IntoIterator<Item = &'a Parameter>,
    base: &Namespace,
) -> Result<Namespace, ModelError> {
    let parameters: Vec<&Parameter> = parameters.into_iter().collect();
    let known: HashSet<&str> = parameters.iter().map(|p| p.name.as_str()).collect();

    let mut pending = Vec::with_capacity(parameters.len());
    for parameter in &parameters {
        let expression = Expression::parse(parameter.expression())
            .map_err(|e| resolution_error(&parameter.name, e.to_string()))?;

        let mut dependencies = Vec::new();
        for name in expression.identifiers() {
            if known.contains(name) {
                dependencies.push(name.to_string());
            } else if !base.contains(name) {
                return Err(resolution_error(
                    &parameter.name,
                    format!("references undefined name '{}'", name),
                ));
            }
        }

        pending.push(Pending {
            name: parameter.name.as_str(),
            expression,
            dependencies,
        });
    }

    let mut namespace = base.clone();
    let mut resolved: HashSet<&str> = HashSet::new();

    while !pending.is_empty() {
        let before = pending.len();
        let mut blocked = Vec::new();

        for item in pending {
            if !item.dependencies.iter().all(|d| resolved.contains(d.as_str())) {
                blocked.push(item);
                continue;
            }
            let value = item
                .expression
                .evaluate(&namespace)
                .map_err(|e| resolution_error(item.name, e.to_string()))?;
            namespace.insert(item.name, value);
            resolved.insert(item.name);
        }

        if blocked.len() == before {
            let cycle: Vec<String> = blocked.iter().map(|p| format!("'{}'", p.name)).collect();
            return Err(resolution_error(
                blocked[0].name,
                format!("circular reference among {}", cycle.join(", ")),
            ));
        }
        pending = blocked;
    }

    Ok(namespace)
}

fn resolution_error(name: &str, reason: String) -> ModelError {
    ModelError::ParameterResolution {
        name: name.to_string(),
        reason,
    }
}
