//! Small sampling helpers shared by the model components. They take any
//! `Rng` so they can be driven by a `Context` generator or a bare seeded one
//! in tests.
use crate::rand::Rng;

/// Returns true with probability `chance` percent. A chance of 0 never fires
/// and anything at or above 100 always fires.
pub fn percent_chance<R: Rng + ?Sized>(rng: &mut R, chance: u32) -> bool {
    rng.random_range(0..100) < chance
}

/// Draws `requested` distinct indices out of `0..len` (or all of them if
/// fewer are available), in the order they were drawn.
pub fn sample_distinct_indices<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    requested: usize,
) -> Vec<usize> {
    crate::rand::seq::index::sample(rng, len, requested.min(len)).into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand::rngs::SmallRng;
    use crate::rand::SeedableRng;

    #[test]
    fn percent_chance_extremes() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(!percent_chance(&mut rng, 0));
            assert!(percent_chance(&mut rng, 100));
            assert!(percent_chance(&mut rng, 250));
        }
    }

    #[test]
    fn percent_chance_frequency() {
        let mut rng = SmallRng::seed_from_u64(11);
        let hits = (0..20_000).filter(|_| percent_chance(&mut rng, 30)).count();
        // Expected 6000, sd ~65
        assert!((5600..6400).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn distinct_indices_are_unique_and_capped() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut picked = sample_distinct_indices(&mut rng, 5, 10);
        assert_eq!(picked.len(), 5);
        picked.sort_unstable();
        assert_eq!(picked, vec![0, 1, 2, 3, 4]);

        let picked = sample_distinct_indices(&mut rng, 100, 3);
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|&i| i < 100));
    }
}
