use std::any::TypeId;
use std::cell::RefMut;

use log::trace;
use xxhash_rust::xxh3::xxh3_64;

use crate::context::Context;
use crate::rand::SeedableRng;
use crate::random::{RngHolder, RngId, RngPlugin};

/// Seed of the generator named `name`, derived from the base seed.
fn stream_seed(base_seed: u64, name: &str) -> u64 {
    base_seed.wrapping_add(xxh3_64(name.as_bytes()))
}

/// Borrows the generator for `R`, creating it on first use.
///
/// # Panics
///
/// Panics if `init_random` was not called, or if the generators are already
/// borrowed (sampling from inside a sampler).
fn get_rng<R: RngId + 'static>(context: &Context) -> RefMut<R::RngType> {
    let data_container = context
        .get_data_container(RngPlugin)
        .expect("You must initialize the random number generator with a base seed");
    let base_seed = data_container.base_seed;

    let rng_holders = data_container
        .rng_holders
        .try_borrow_mut()
        .expect("A random number generator is already borrowed");
    RefMut::map(rng_holders, |holders| {
        holders
            .entry(TypeId::of::<R>())
            .or_insert_with(|| {
                let seed = stream_seed(base_seed, R::get_name());
                trace!("seeding RNG {} with {seed}", R::get_name());
                RngHolder {
                    rng: Box::new(R::RngType::seed_from_u64(seed)),
                }
            })
            .rng
            .downcast_mut::<R::RngType>()
            .expect("RNG holder has the wrong type")
    })
}

pub trait ContextRandomExt {
    /// Sets the base seed every named generator derives from. Generators
    /// already in use are dropped and re-seeded on their next draw.
    fn init_random(&mut self, base_seed: u64);

    /// Gets a random sample from the random number generator associated with the given
    /// [`RngId`] by applying the specified sampler function.
    ///
    /// The sampler borrows the generator mutably while the `Context` itself
    /// is only borrowed shared, so the sampler may read (but not mutate)
    /// other data plugins.
    fn sample<R: RngId + 'static, T>(
        &self,
        rng_id: R,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T;
}

impl ContextRandomExt for Context {
    fn init_random(&mut self, base_seed: u64) {
        trace!("base seed set to {base_seed}");
        let data_container = self.get_data_container_mut(RngPlugin);
        data_container.base_seed = base_seed;
        data_container.rng_holders.get_mut().clear();
    }

    fn sample<R: RngId + 'static, T>(
        &self,
        _rng_id: R,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T {
        let mut rng = get_rng::<R>(self);
        sampler(&mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_rng;
    use crate::rand::rngs::{SmallRng, StdRng};
    use crate::rand::{Rng, RngCore};
    use crate::random::percent_chance;

    define_rng!(ExposureTestRng);
    define_rng!(RecoveryTestRng);
    define_rng!(SeedingTestRng, crate::rand::rngs::StdRng);

    #[test]
    fn generator_is_seeded_from_base_seed_and_name() {
        let mut context = Context::new();
        context.init_random(42);
        let drawn = context.sample(ExposureTestRng, RngCore::next_u64);

        let mut expected = SmallRng::seed_from_u64(stream_seed(42, "ExposureTestRng"));
        assert_eq!(drawn, expected.next_u64());
    }

    #[test]
    fn generator_type_can_be_chosen() {
        let mut context = Context::new();
        context.init_random(42);
        let drawn = context.sample(SeedingTestRng, RngCore::next_u64);

        let mut expected = StdRng::seed_from_u64(stream_seed(42, "SeedingTestRng"));
        assert_eq!(drawn, expected.next_u64());
    }

    #[test]
    #[should_panic(expected = "You must initialize the random number generator with a base seed")]
    fn sampling_before_init_panics() {
        let context = Context::new();
        context.sample(ExposureTestRng, RngCore::next_u64);
    }

    #[test]
    fn named_streams_do_not_interfere() {
        let mut context = Context::new();
        context.init_random(7);
        let first = context.sample(ExposureTestRng, RngCore::next_u64);
        assert_ne!(first, context.sample(RecoveryTestRng, RngCore::next_u64));

        context.init_random(7);
        for _ in 0..25 {
            context.sample(RecoveryTestRng, RngCore::next_u64);
        }
        assert_eq!(first, context.sample(ExposureTestRng, RngCore::next_u64));
    }

    #[test]
    fn reseeding_replays_or_changes_the_stream() {
        let mut context = Context::new();
        context.init_random(3);
        let run: Vec<u64> = (0..3)
            .map(|_| context.sample(ExposureTestRng, RngCore::next_u64))
            .collect();

        context.init_random(3);
        let replay: Vec<u64> = (0..3)
            .map(|_| context.sample(ExposureTestRng, RngCore::next_u64))
            .collect();
        assert_eq!(run, replay);

        context.init_random(4);
        assert_ne!(run[0], context.sample(ExposureTestRng, RngCore::next_u64));
    }

    #[test]
    fn sampler_closure_draws_from_the_named_stream() {
        let mut context = Context::new();
        context.init_random(11);
        for _ in 0..100 {
            let (day, certain, never) = context.sample(RecoveryTestRng, |rng| {
                (
                    rng.random_range(1..=30_u32),
                    percent_chance(rng, 100),
                    percent_chance(rng, 0),
                )
            });
            assert!((1..=30).contains(&day));
            assert!(certain);
            assert!(!never);
        }
    }
}
