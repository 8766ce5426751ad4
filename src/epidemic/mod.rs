//! An agent-based epidemic on a toroidal grid.
//!
//! Every cell of a square grid holds one citizen. Each day, every active
//! case (a citizen that is Susceptible or Ill) meets a handful of its
//! neighbors, may pass the infection on to the healthy ones, and then moves
//! along its own disease course:
//!
//! ```text
//! Healthy -> Susceptible -> Ill -> Dead
//!                 |          |
//!                 +----------+---> Recovered
//! ```
//!
//! When the share of ill and dead citizens exceeds a threshold, quarantine
//! suppresses all contacts until it drops again. The run ends when no active
//! case is left.
//!
//! A model is set up in three steps, after which `Context::execute` runs it:
//!
//! ```no_run
//! use std::path::Path;
//!
//! use grid_epi::epidemic;
//! use grid_epi::prelude::*;
//!
//! let mut context = Context::new();
//! context.init_random(42);
//! context.init_parameters(Path::new("config.json")).unwrap();
//! epidemic::init(&mut context).unwrap();
//! context.execute();
//! println!("{}", context.get_stats());
//! ```
pub mod active_cases;
pub mod age;
pub mod citizen;
pub mod contacts;
pub mod parameters;
pub mod population;
pub mod quarantine;
pub mod reports;
pub mod simulation;
pub mod stats;
pub mod transmission;

pub use citizen::{Citizen, CitizenId, HealthState, SeverityLevel};
pub use parameters::{AgeBand, ContextParametersExt, Parameters, Params};
pub use simulation::{ContextEpidemicExt, Epidemic, Termination};
pub use stats::SimulationStats;
pub use transmission::{CarePathway, SelfCare};

use crate::context::Context;
use crate::error::EpiError;

/// Opens the report files and builds the epidemic. Parameters and the random
/// seed must already be set.
///
/// # Errors
///
/// Returns an `EpiError` if a report file can't be created.
pub fn init(context: &mut Context) -> Result<(), EpiError> {
    reports::init(context)?;
    context.init_epidemic();
    Ok(())
}
