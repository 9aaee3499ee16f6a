/// Number of decimal places to which time steps must agree.
pub const UNIFORM_STEP_DECIMALS: i32 = 10;

/// `points` evenly spaced values over `[start, stop]`, both ends included.
pub fn linspace(start: f64, stop: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (points - 1) as f64;
            (0..points)
                .map(|i| {
                    if i == points - 1 {
                        stop
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// The common step of a uniform grid, or `None` if the grid has fewer than two
/// points or its successive differences disagree after rounding to
/// [`UNIFORM_STEP_DECIMALS`] places.
pub fn uniform_step(values: &[f64]) -> Option<f64> {
    let mut steps = values
        .windows(2)
        .map(|w| round_to(w[1] - w[0], UNIFORM_STEP_DECIMALS));
    let first = steps.next()?;
    steps.all(|step| step == first).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_ends() {
        let grid = linspace(0.0, 20.0, 401);
        assert_eq!(grid.len(), 401);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[400], 20.0);
        assert_eq!(uniform_step(&grid), Some(0.05));
    }

    #[test]
    fn uniform_step_accepts_evenly_spaced_values() {
        assert_eq!(uniform_step(&[0.0, 5.0, 10.0, 15.0]), Some(5.0));
        assert_eq!(uniform_step(&[0.0, 0.1, 0.2, 0.3]), Some(0.1));
    }

    #[test]
    fn uniform_step_rejects_uneven_or_short_grids() {
        assert_eq!(uniform_step(&[0.0, 5.0, 11.0, 15.0]), None);
        assert_eq!(uniform_step(&[1.0]), None);
        assert_eq!(uniform_step(&[]), None);
    }
}
