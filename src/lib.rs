//! An agent-based epidemic simulator on a toroidal population grid
//!
//! Every cell of a square grid holds one citizen. Each simulated day the
//! citizens that have been exposed meet some of their neighbors, may pass the
//! infection on, and move through the disease states until they recover or
//! die. The run ends when nobody is infectious any more.
//!
//! The crate is split in two layers:
//! * a small discrete-event core: the [`context::Context`] that owns all
//!   state as data plugins and executes plans in time order, named
//!   reproducible random number generators ([`random`]), typed global
//!   properties loaded from JSON ([`global_properties`]), CSV reports
//!   ([`report`]), logging ([`log`]) and a command line runner ([`runner`]);
//! * the model itself in [`epidemic`]: the citizen grid, the contact
//!   sampler, the transmission and progression rules, the active-case
//!   tracker, the quarantine controller and the daily driver.
pub mod context;
pub mod epidemic;
pub mod error;
pub mod global_properties;
pub mod log;
pub mod plan;
pub mod prelude;
pub mod random;
pub mod report;
pub mod runner;

// Re-exports for use in macros
pub use csv;
pub use paste;
pub use rand;

pub use context::{Context, ExecutionPhase};
pub use error::EpiError;
