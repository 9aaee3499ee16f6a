use super::error::NamingError;
use phf::{Set, phf_set};

/// Names reserved for internal use in formulas.
pub static RESERVED_NAMES: Set<&'static str> = phf_set! {
    "vol",
};

/// Formula operator characters that may not appear in a name.
pub static SPECIAL_CHARACTERS: Set<char> = phf_set! {
    '[', ']', '+', '-', '*', '/', '.', '^',
};

const SPECIAL_CHARACTERS_DISPLAY: &str = "[ ] + - * / . ^";

/// Checks the context-free part of the naming invariant: the name must be
/// non-empty, not reserved, not purely numeric, and free of operator
/// characters. Collisions with existing entities are checked by the model.
pub fn check_name_syntax(name: &str) -> Result<(), NamingError> {
    if name.is_empty() {
        return Err(NamingError::Empty);
    }
    if RESERVED_NAMES.contains(name) {
        return Err(NamingError::Reserved {
            name: name.to_string(),
            reserved: RESERVED_NAMES.iter().copied().collect::<Vec<_>>().join(", "),
        });
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return Err(NamingError::Numeric(name.to_string()));
    }
    if name.chars().any(|c| SPECIAL_CHARACTERS.contains(&c)) {
        return Err(NamingError::SpecialCharacter {
            name: name.to_string(),
            characters: SPECIAL_CHARACTERS_DISPLAY.to_string(),
        });
    }
    Ok(())
}
