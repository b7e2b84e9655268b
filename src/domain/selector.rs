//! Weighted random selection over a destination list.
//!
//! The probability of picking destination `i` is `w_i / Σw` over the
//! destinations with a positive weight. Selection is a single O(n) walk over
//! the cumulative weights; list order does not affect the distribution.

use rand::Rng;

use super::entities::Destination;

/// Reasons a destination list cannot produce a pick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("no destination with a positive weight")]
    NoSelectableDestination,

    #[error("destination {index} has an invalid weight {weight}")]
    InvalidWeight { index: usize, weight: f64 },
}

/// Rejects weights that could only come from corrupted storage.
///
/// Returns the weight sum, which is finite when this succeeds.
fn check_weights(destinations: &[Destination]) -> Result<f64, SelectionError> {
    let mut total = 0.0;
    for (index, d) in destinations.iter().enumerate() {
        total += d.weight;
        if !d.weight.is_finite() || d.weight < 0.0 || !total.is_finite() {
            return Err(SelectionError::InvalidWeight {
                index,
                weight: d.weight,
            });
        }
    }
    Ok(total)
}

/// Picks a destination for a uniform draw `unit` in `[0, 1)`.
///
/// `r = unit * Σw`; the first positive-weight destination whose running sum
/// exceeds `r` wins. Draws outside `[0, 1)` are clamped.
pub fn pick(destinations: &[Destination], unit: f64) -> Result<&Destination, SelectionError> {
    let total = check_weights(destinations)?;
    if total <= 0.0 {
        return Err(SelectionError::NoSelectableDestination);
    }

    let unit = if unit.is_finite() {
        unit.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let threshold = unit * total;

    let mut cumulative = 0.0;
    let mut last_positive = None;
    for d in destinations.iter().filter(|d| d.weight > 0.0) {
        cumulative += d.weight;
        if threshold < cumulative {
            return Ok(d);
        }
        last_positive = Some(d);
    }

    // Rounding in the running sum can leave `threshold` just past the end.
    last_positive.ok_or(SelectionError::NoSelectableDestination)
}

/// Selects a destination proportionally to its weight.
///
/// A list with exactly one positive weight returns that destination without
/// drawing from `rng`.
pub fn select<'a, R: Rng + ?Sized>(
    destinations: &'a [Destination],
    rng: &mut R,
) -> Result<&'a Destination, SelectionError> {
    check_weights(destinations)?;

    let mut positive = destinations.iter().filter(|d| d.weight > 0.0);
    match (positive.next(), positive.next()) {
        (None, _) => Err(SelectionError::NoSelectableDestination),
        (Some(only), None) => Ok(only),
        _ => pick(destinations, rng.random::<f64>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn destinations(weights: &[f64]) -> Vec<Destination> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| Destination::new(format!("https://d{}.example/", i), *w))
            .collect()
    }

    fn shares(destinations: &[Destination], draws: usize, seed: u64) -> HashMap<String, f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..draws {
            let chosen = select(destinations, &mut rng).unwrap();
            *counts.entry(chosen.url.clone()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(url, n)| (url, n as f64 / draws as f64))
            .collect()
    }

    /// Rng that panics when used, to prove no entropy is drawn.
    struct NoEntropy;

    impl rand::RngCore for NoEntropy {
        fn next_u32(&mut self) -> u32 {
            panic!("entropy drawn")
        }
        fn next_u64(&mut self) -> u64 {
            panic!("entropy drawn")
        }
        fn fill_bytes(&mut self, _dst: &mut [u8]) {
            panic!("entropy drawn")
        }
    }

    #[test]
    fn test_equal_weights_converge() {
        let dests = destinations(&[1.0, 1.0, 1.0, 1.0]);
        let shares = shares(&dests, 100_000, 7);

        assert_eq!(shares.len(), 4);
        for share in shares.values() {
            assert!((share - 0.25).abs() < 0.25 * 0.05, "share {} off 25%", share);
        }
    }

    #[test]
    fn test_relative_proportion_independent_of_sum() {
        let dests = destinations(&[10.0, 5.0]);
        let shares = shares(&dests, 100_000, 11);

        let a = shares["https://d0.example/"];
        let b = shares["https://d1.example/"];
        assert!((a / b - 2.0).abs() < 0.1, "ratio {}", a / b);
    }

    #[test]
    fn test_zero_weight_never_selected() {
        let dests = destinations(&[0.0, 3.0, 0.0, 1.0]);
        let shares = shares(&dests, 20_000, 3);

        assert!(!shares.contains_key("https://d0.example/"));
        assert!(!shares.contains_key("https://d2.example/"));
    }

    #[test]
    fn test_single_destination_uses_no_entropy() {
        let dests = destinations(&[5.0]);
        let chosen = select(&dests, &mut NoEntropy).unwrap();
        assert_eq!(chosen.url, "https://d0.example/");
    }

    #[test]
    fn test_single_positive_among_zeros_uses_no_entropy() {
        let dests = destinations(&[0.0, 2.0, 0.0]);
        let chosen = select(&dests, &mut NoEntropy).unwrap();
        assert_eq!(chosen.url, "https://d1.example/");
    }

    #[test]
    fn test_all_zero_weights() {
        let dests = destinations(&[0.0, 0.0]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            select(&dests, &mut rng),
            Err(SelectionError::NoSelectableDestination)
        );
    }

    #[test]
    fn test_empty_list() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            select(&[], &mut rng),
            Err(SelectionError::NoSelectableDestination)
        );
        assert_eq!(pick(&[], 0.5), Err(SelectionError::NoSelectableDestination));
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut rng = StdRng::seed_from_u64(1);

        let negative = destinations(&[1.0, -1.0]);
        assert!(matches!(
            select(&negative, &mut rng),
            Err(SelectionError::InvalidWeight { index: 1, .. })
        ));

        let nan = destinations(&[f64::NAN, 1.0]);
        assert!(matches!(
            pick(&nan, 0.1),
            Err(SelectionError::InvalidWeight { index: 0, .. })
        ));
    }

    #[test]
    fn test_overflowing_weight_sum_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let huge = destinations(&[1e308, 1e308]);

        assert!(matches!(
            select(&huge, &mut rng),
            Err(SelectionError::InvalidWeight { index: 1, .. })
        ));
        assert!(matches!(
            pick(&huge, 0.1),
            Err(SelectionError::InvalidWeight { index: 1, .. })
        ));
    }

    #[test]
    fn test_large_finite_weights_stay_proportional() {
        let dests = destinations(&[1e307, 1e307]);
        let shares = shares(&dests, 10_000, 5);

        let first = shares["https://d0.example/"];
        assert!((first - 0.5).abs() < 0.05, "share {}", first);
    }

    #[test]
    fn test_pick_boundaries() {
        let dests = destinations(&[1.0, 0.0, 3.0]);

        assert_eq!(pick(&dests, 0.0).unwrap().url, "https://d0.example/");
        assert_eq!(pick(&dests, 0.2499).unwrap().url, "https://d0.example/");
        // Exactly on the boundary belongs to the next positive destination
        assert_eq!(pick(&dests, 0.25).unwrap().url, "https://d2.example/");
        assert_eq!(pick(&dests, 0.999_999).unwrap().url, "https://d2.example/");
    }

    #[test]
    fn test_pick_clamps_out_of_range_draws() {
        let dests = destinations(&[1.0, 1.0]);
        assert_eq!(pick(&dests, 1.0).unwrap().url, "https://d1.example/");
        assert_eq!(pick(&dests, 7.5).unwrap().url, "https://d1.example/");
        assert_eq!(pick(&dests, -3.0).unwrap().url, "https://d0.example/");
        assert_eq!(pick(&dests, f64::NAN).unwrap().url, "https://d0.example/");
    }
}
