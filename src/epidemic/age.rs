//! Age sampling from a cumulative age-band table.
use rand::Rng;

use crate::epidemic::parameters::AgeBand;

/// Draws an age: a percentile in `1..=100` picks the first band whose
/// cumulative density reaches it, then the age is uniform between the
/// previous band's upper bound (inclusive) and this band's (exclusive).
pub fn sample_age<R: Rng + ?Sized>(rng: &mut R, bands: &[AgeBand]) -> u32 {
    let percentile = rng.random_range(1..=100);
    age_in_percentile(rng, bands, percentile)
}

fn age_in_percentile<R: Rng + ?Sized>(rng: &mut R, bands: &[AgeBand], percentile: u32) -> u32 {
    let mut lower_bound = 0;
    for band in bands {
        if band.density >= percentile {
            if band.upper_bound <= lower_bound {
                return lower_bound;
            }
            return rng.random_range(lower_bound..band.upper_bound);
        }
        lower_bound = band.upper_bound;
    }
    // Only reachable with a table whose last density is below 100.
    lower_bound
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::epidemic::parameters::Parameters;

    #[test]
    fn percentile_selects_band() {
        let bands = Parameters::default().age_groups_density;
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!(age_in_percentile(&mut rng, &bands, 1) < 10);
            assert!(age_in_percentile(&mut rng, &bands, 3) < 10);
            let age = age_in_percentile(&mut rng, &bands, 4);
            assert!((10..25).contains(&age));
            let age = age_in_percentile(&mut rng, &bands, 100);
            assert!((75..100).contains(&age));
        }
    }

    #[test]
    fn empty_band_yields_lower_bound() {
        let bands = [AgeBand::new(20, 50), AgeBand::new(20, 60), AgeBand::new(30, 100)];
        let mut rng = SmallRng::seed_from_u64(2);
        assert_eq!(age_in_percentile(&mut rng, &bands, 55), 20);
    }

    #[test]
    fn proportions_follow_cumulative_density() {
        let bands = Parameters::default().age_groups_density;
        let mut rng = SmallRng::seed_from_u64(42);
        let draws = 100_000;
        let ages: Vec<u32> = (0..draws).map(|_| sample_age(&mut rng, &bands)).collect();

        for band in &bands {
            #[allow(clippy::cast_precision_loss)]
            let fraction =
                ages.iter().filter(|&&age| age < band.upper_bound).count() as f64 / draws as f64;
            assert_approx_eq!(fraction, f64::from(band.density) / 100.0, 0.01);
        }
        assert!(ages.iter().all(|&age| age < 100));
    }
}
