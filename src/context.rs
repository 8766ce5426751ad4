//! The `Context` owns all state of a simulation run and drives it forward.
//!
//! Modules register their state as *data plugins* (see `define_data_plugin!`)
//! and their behavior as *plans*: callbacks that fire at a point in simulated
//! time. Time is measured in days. Plans scheduled for the same day run in
//! `ExecutionPhase` order, so a model can step its population in the
//! `Normal` phase and record the outcome in the `Last` phase.
use std::any::{Any, TypeId};

use log::trace;
use rustc_hash::FxHashMap;

use crate::plan::Queue;

/// A trait for objects that can provide data containers to be held by `Context`
pub trait DataPlugin: Any {
    type DataContainer;

    fn create_data_container() -> Self::DataContainer;
}

/// Defines a new type for storing data in `Context`.
#[macro_export]
macro_rules! define_data_plugin {
    ($plugin:ident, $data_container:ty, $default: expr) => {
        #[derive(Copy, Clone)]
        struct $plugin;

        impl $crate::context::DataPlugin for $plugin {
            type DataContainer = $data_container;

            fn create_data_container() -> Self::DataContainer {
                $default
            }
        }
    };
}
pub use define_data_plugin;

/// The order in which plans scheduled for the same time are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExecutionPhase {
    First,
    Normal,
    Last,
}

type Callback = dyn FnOnce(&mut Context);

pub struct Context {
    plan_queue: Queue<Box<Callback>, ExecutionPhase>,
    data_plugins: FxHashMap<TypeId, Box<dyn Any>>,
    current_time: f64,
}

impl Context {
    #[must_use]
    pub fn new() -> Context {
        Context {
            plan_queue: Queue::new(),
            data_plugins: FxHashMap::default(),
            current_time: 0.0,
        }
    }

    /// Schedules `callback` to run at `time` in the `Normal` phase.
    ///
    /// # Panics
    ///
    /// Panics if `time` is NaN, infinite, or earlier than the current time.
    pub fn add_plan(&mut self, time: f64, callback: impl FnOnce(&mut Context) + 'static) {
        self.add_plan_with_phase(time, callback, ExecutionPhase::Normal)
    }

    /// Schedules `callback` to run at `time` in the given `phase`.
    ///
    /// # Panics
    ///
    /// Panics if `time` is NaN, infinite, or earlier than the current time.
    pub fn add_plan_with_phase(
        &mut self,
        time: f64,
        callback: impl FnOnce(&mut Context) + 'static,
        phase: ExecutionPhase,
    ) {
        assert!(
            !time.is_nan() && !time.is_infinite() && time >= self.current_time,
            "Time {time} is invalid"
        );
        trace!("adding plan at {time} ({phase:?})");
        self.plan_queue.add_plan(time, Box::new(callback), phase);
    }

    /// Gets a mutable reference to the data container of plugin `T`,
    /// creating it with its default value on first use.
    ///
    /// # Panics
    ///
    /// Panics only if the stored container has a different type than
    /// `T::DataContainer`, which `define_data_plugin!` rules out.
    #[allow(clippy::missing_panics_doc)]
    pub fn get_data_container_mut<T: DataPlugin>(&mut self, _plugin: T) -> &mut T::DataContainer {
        self.data_plugins
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::create_data_container()))
            .downcast_mut::<T::DataContainer>()
            .expect("data plugin container has the wrong type")
    }

    /// Gets a reference to the data container of plugin `T`, or `None` if
    /// nothing has initialized it yet.
    #[must_use]
    pub fn get_data_container<T: DataPlugin>(&self, _plugin: T) -> Option<&T::DataContainer> {
        self.data_plugins
            .get(&TypeId::of::<T>())
            .and_then(|container| container.downcast_ref::<T::DataContainer>())
    }

    #[must_use]
    pub fn get_current_time(&self) -> f64 {
        self.current_time
    }

    /// Executes plans in time order until none remain. A model ends its run
    /// by not scheduling any further plan.
    pub fn execute(&mut self) {
        trace!("entering event loop");
        while let Some(plan) = self.plan_queue.get_next_plan() {
            self.current_time = plan.time;
            (plan.data)(self);
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
