use crate::core::expression::is_builtin_function;
use crate::core::expression::lexer::{is_ident_continue, scan_identifiers};
use std::collections::HashMap;
use thiserror::Error;

/// Alias pinned to the reserved volume name.
pub const VOLUME_ALIAS: &str = "V";

const VOLUME_NAME: &str = "vol";

// Private-use code points never occur in model names or formulas.
const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("Name '{name}' in expression '{expression}' is neither a species nor a parameter")]
    UnknownName { name: String, expression: String },
}

/// Maps species names to `S[i]` in iteration order.
pub fn species_aliases<'a>(names: impl IntoIterator<Item = &'a str>) -> HashMap<String, String> {
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), format!("S[{}]", i)))
        .collect()
}

/// Maps parameter names to `P{i}` in iteration order, with `vol` pinned to `V`.
///
/// Indices follow the parameter's position, so they stay stable when `vol`
/// itself is absent from `names`.
pub fn parameter_aliases<'a>(names: impl IntoIterator<Item = &'a str>) -> HashMap<String, String> {
    let mut aliases = HashMap::from([(VOLUME_NAME.to_string(), VOLUME_ALIAS.to_string())]);
    for (i, name) in names.into_iter().enumerate() {
        aliases
            .entry(name.to_string())
            .or_insert_with(|| format!("P{}", i));
    }
    aliases
}

/// Rewrites `expression` in terms of species and parameter aliases.
///
/// Names are consumed longest first and each occurrence is swapped for a
/// numbered placeholder before any alias is written. An alias can therefore
/// never be re-matched as a source name, and `X10` is fully consumed before
/// `X1` is considered. Only whole identifiers are replaced.
///
/// # Errors
///
/// Returns [`SanitizeError::UnknownName`] if the expression references an
/// identifier found in neither mapping that is not a builtin function.
pub fn sanitize(
    expression: &str,
    species: &HashMap<String, String>,
    parameters: &HashMap<String, String>,
) -> Result<String, SanitizeError> {
    let mut names: Vec<&str> = species
        .keys()
        .chain(parameters.keys())
        .map(String::as_str)
        .collect();
    names.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    names.dedup();

    let mut text = expression.to_string();
    let mut aliases = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let alias = parameters
            .get(*name)
            .or_else(|| species.get(*name))
            .map(String::as_str)
            .unwrap_or(*name);
        text = replace_identifier(&text, name, &placeholder(index));
        aliases.push(alias);
    }

    if let Some((_, name)) = scan_identifiers(&text)
        .into_iter()
        .find(|(_, name)| !is_builtin_function(name))
    {
        return Err(SanitizeError::UnknownName {
            name: name.to_string(),
            expression: expression.to_string(),
        });
    }

    Ok(expand_placeholders(&text, &aliases))
}

fn placeholder(index: usize) -> String {
    format!("{}{}{}", PLACEHOLDER_OPEN, index, PLACEHOLDER_CLOSE)
}

/// Replaces occurrences of `name` that are not embedded in a longer identifier.
///
/// When `name` is also a builtin function, occurrences followed by `(` are
/// calls and stay as they are.
fn replace_identifier(text: &str, name: &str, replacement: &str) -> String {
    if name.is_empty() {
        return text.to_string();
    }
    let builtin = is_builtin_function(name);
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(offset) = text[search..].find(name) {
        let start = search + offset;
        let end = start + name.len();
        let before_ok = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !is_ident_continue(c));
        let after_ok = text[end..]
            .chars()
            .next()
            .is_none_or(|c| !is_ident_continue(c));
        let is_call = builtin && text[end..].trim_start().starts_with('(');

        if before_ok && after_ok && !is_call {
            out.push_str(&text[copied..start]);
            out.push_str(replacement);
            copied = end;
            search = end;
        } else {
            search = start + text[start..].chars().next().map_or(1, char::len_utf8);
        }
    }

    out.push_str(&text[copied..]);
    out
}

fn expand_placeholders(text: &str, aliases: &[&str]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != PLACEHOLDER_OPEN {
            out.push(c);
            continue;
        }
        let index: usize = chars
            .by_ref()
            .take_while(|&d| d != PLACEHOLDER_CLOSE)
            .fold(0, |acc, d| acc * 10 + d.to_digit(10).unwrap_or(0) as usize);
        if let Some(alias) = aliases.get(index) {
            out.push_str(alias);
        }
    }
    out
}
