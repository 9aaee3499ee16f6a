use crate::core::models::reaction::Stoichiometry;
use thiserror::Error;

/// Highest total reactant stoichiometry a mass-action propensity supports.
pub const MAX_MASS_ACTION_ORDER: u32 = 2;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("mass-action propensities support total reactant order 0, 1 or 2, found {order}")]
pub struct OrderTooHighError {
    pub order: u32,
}

/// Derives the mass-action propensity of a reaction from its reactants.
///
/// The rate enters the formula by name, so its value is looked up only when
/// the formula is evaluated. The three supported shapes are:
///
/// | reactants   | propensity               |
/// |-------------|--------------------------|
/// | none        | `k*vol`                  |
/// | `X`         | `k*X`                    |
/// | `X + Y`     | `k*X*Y/vol`              |
/// | `2X`        | `0.5*k*X*(X-1)/vol`      |
///
/// # Errors
///
/// Returns [`OrderTooHighError`] when the total reactant stoichiometry exceeds
/// [`MAX_MASS_ACTION_ORDER`]; such reactions need a custom propensity.
pub fn build_mass_action(reactants: &Stoichiometry, rate: &str) -> Result<String, OrderTooHighError> {
    let order = reactants.total();
    if order > MAX_MASS_ACTION_ORDER {
        return Err(OrderTooHighError { order });
    }

    let mut propensity = rate.to_string();
    for (species, count) in reactants.iter() {
        if count == 2 {
            // Number of distinct pairs among X molecules.
            propensity = format!("0.5*{}*{}*({}-1)/vol", propensity, species, species);
        } else {
            propensity.push('*');
            propensity.push_str(species);
        }
    }

    // The dimer case already carries its volume factor, so the correction
    // keys on the number of distinct reactants rather than the total order.
    match reactants.len() {
        0 => propensity.push_str("*vol"),
        2 => propensity.push_str("/vol"),
        _ => {}
    }

    Ok(propensity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stoich(entries: &[(&str, u32)]) -> Stoichiometry {
        entries.iter().map(|(s, n)| (*s, *n)).collect()
    }

    #[test]
    fn zeroth_order_scales_with_volume() {
        assert_eq!(build_mass_action(&stoich(&[]), "k").unwrap(), "k*vol");
    }

    #[test]
    fn first_order_has_no_volume_factor() {
        assert_eq!(build_mass_action(&stoich(&[("X", 1)]), "k").unwrap(), "k*X");
    }

    #[test]
    fn second_order_distinct_species_divides_by_volume() {
        assert_eq!(
            build_mass_action(&stoich(&[("X", 1), ("Y", 1)]), "k").unwrap(),
            "k*X*Y/vol"
        );
    }

    #[test]
    fn dimerization_counts_pairs() {
        assert_eq!(
            build_mass_action(&stoich(&[("X", 2)]), "k").unwrap(),
            "0.5*k*X*(X-1)/vol"
        );
    }

    #[test]
    fn factor_order_follows_reactant_order() {
        assert_eq!(
            build_mass_action(&stoich(&[("Y", 1), ("X", 1)]), "k2").unwrap(),
            "k2*Y*X/vol"
        );
    }

    #[test]
    fn third_order_is_rejected() {
        assert_eq!(
            build_mass_action(&stoich(&[("X", 3)]), "k"),
            Err(OrderTooHighError { order: 3 })
        );
        assert_eq!(
            build_mass_action(&stoich(&[("X", 2), ("Y", 1)]), "k"),
            Err(OrderTooHighError { order: 3 })
        );
        assert_eq!(
            build_mass_action(&stoich(&[("X", 1), ("Y", 1), ("Z", 1)]), "k"),
            Err(OrderTooHighError { order: 3 })
        );
    }

    #[test]
    fn huge_stoichiometry_does_not_wrap_to_a_low_order() {
        assert_eq!(
            build_mass_action(&stoich(&[("A", u32::MAX), ("B", 1)]), "k"),
            Err(OrderTooHighError { order: u32::MAX })
        );
    }
}
