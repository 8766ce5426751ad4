//! Named, reproducible random number generators.
//!
//! Every stochastic component of a model draws from its own generator,
//! declared with `define_rng!`. All generators derive from a single base seed
//! set with `ContextRandomExt::init_random`: the generator for `EpidemicRng` is
//! seeded with `base_seed + xxh3("EpidemicRng")`. Two runs with the same base seed
//! therefore make identical draws, and adding draws to one component does not
//! shift the stream seen by another.
mod context_ext;
mod macros;
mod sampling;

use std::any::{Any, TypeId};
use std::cell::RefCell;

use rustc_hash::FxHashMap;

pub use context_ext::ContextRandomExt;
pub use macros::define_rng;
pub use sampling::{percent_chance, sample_distinct_indices};

use crate::define_data_plugin;
use crate::rand::SeedableRng;

pub trait RngId: Copy + Clone + Any {
    type RngType: SeedableRng;
    fn get_name() -> &'static str;
}

// This is a wrapper that allows for future support for different types of
// random number generators (anything that implements SeedableRng is valid).
struct RngHolder {
    rng: Box<dyn Any>,
}

struct RngData {
    base_seed: u64,
    rng_holders: RefCell<FxHashMap<TypeId, RngHolder>>,
}

// Registers a data container which stores:
// * base_seed: A base seed for all rngs
// * rng_holders: A map of rngs, keyed by their RngId. Note that this is
//   stored in a RefCell to allow for mutable borrow without requiring a
//   mutable borrow of the Context itself.
define_data_plugin!(
    RngPlugin,
    RngData,
    RngData {
        base_seed: 0,
        rng_holders: RefCell::new(FxHashMap::default()),
    }
);
