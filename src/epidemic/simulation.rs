//! The epidemic state and the day loop that drives it.
//!
//! [`Epidemic`] bundles the grid, the active cases, the counters and the
//! quarantine flag, and advances them one day at a time with
//! [`Epidemic::step_day`]. The `Context` side stores it in a data plugin
//! and runs one day per plan, rescheduling itself until no active case is
//! left or `MaxDays` is reached.
use std::cell::{Ref, RefCell, RefMut};

use log::{debug, info};
use rand::Rng;

use crate::context::Context;
use crate::define_data_plugin;
use crate::define_rng;
use crate::epidemic::active_cases::ActiveCases;
use crate::epidemic::citizen::{CitizenId, HealthState};
use crate::epidemic::contacts::{contact_budget, sample_contacts};
use crate::epidemic::parameters::{ContextParametersExt, Parameters};
use crate::epidemic::population::PopulationGrid;
use crate::epidemic::quarantine::{QuarantineChange, QuarantineController};
use crate::epidemic::stats::SimulationStats;
use crate::epidemic::transmission::{expose, progress, CarePathway, SelfCare};
use crate::random::{percent_chance, sample_distinct_indices, ContextRandomExt};

pub const DAYS_PER_YEAR: u32 = 365;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// No active case is left.
    Resolved,
    /// `MaxDays` was reached with cases still active.
    HorizonReached,
}

/// Notable events of one simulated day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayOutcome {
    /// Number of years passed, if a year rolled over at the start of the day.
    pub year_passed: Option<u32>,
    pub quarantine_change: Option<QuarantineChange>,
}

pub struct Epidemic {
    grid: PopulationGrid,
    active: ActiveCases,
    stats: SimulationStats,
    quarantine: QuarantineController,
    pathway: Box<dyn CarePathway>,
    years_passed: u32,
    termination: Option<Termination>,
}

impl Epidemic {
    /// A fully healthy population; nobody is active yet.
    pub fn new<R: Rng + ?Sized>(params: &Parameters, rng: &mut R) -> Epidemic {
        let grid = PopulationGrid::new(params, rng);
        let stats = SimulationStats::new(grid.len());
        Epidemic {
            grid,
            active: ActiveCases::new(),
            stats,
            quarantine: QuarantineController::default(),
            pathway: Box::new(SelfCare),
            years_passed: 0,
            termination: None,
        }
    }

    #[must_use]
    pub fn with_pathway(mut self, pathway: Box<dyn CarePathway>) -> Epidemic {
        self.pathway = pathway;
        self
    }

    #[must_use]
    pub fn grid(&self) -> &PopulationGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut PopulationGrid {
        &mut self.grid
    }

    #[must_use]
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    #[must_use]
    pub fn active_cases(&self) -> &ActiveCases {
        &self.active
    }

    #[must_use]
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Makes a healthy citizen ill and active. Returns false if the citizen
    /// was not healthy.
    pub fn seed_ill(&mut self, id: CitizenId) -> bool {
        let citizen = self.grid.get_mut(id);
        if citizen.state != HealthState::Healthy {
            return false;
        }
        self.stats
            .record_transition(HealthState::Healthy, HealthState::Ill);
        citizen.transition(HealthState::Ill);
        self.active.push(id);
        true
    }

    /// Seeds `count` distinct citizens, chosen uniformly, as ill.
    pub fn seed_random<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        for index in sample_distinct_indices(rng, self.grid.len(), count) {
            let id = self.grid.id_at(index);
            self.seed_ill(id);
        }
    }

    /// Advances the epidemic by one day.
    ///
    /// Each active case first meets its contacts for the day (none while
    /// quarantine is in force) and then has its own state progressed.
    /// Quarantine is re-evaluated after every case has been visited and
    /// takes effect the next day.
    pub fn step_day<R: Rng + ?Sized>(&mut self, params: &Parameters, rng: &mut R) -> DayOutcome {
        let mut outcome = DayOutcome::default();
        if self.stats.days_count > 0 && self.stats.days_count % DAYS_PER_YEAR == 0 {
            self.grid.tick_year();
            self.years_passed += 1;
            outcome.year_passed = Some(self.years_passed);
        }
        self.stats.days_count += 1;
        self.grid.tick_day();
        self.stats.current_mortality = params.current_mortality(self.stats.total_infected);

        let mut review = self.active.review();
        while let Some(id) = review.next_case() {
            for contact in self.daily_contacts(id, params, rng) {
                if self.grid.get(contact).self_isolated
                    && percent_chance(rng, params.self_isolation_strictness)
                {
                    continue;
                }
                let exposed = expose(
                    &mut self.grid,
                    &mut self.stats,
                    id,
                    contact,
                    params.transition_rate,
                    rng,
                );
                if let Some(exposed) = exposed.filter(|&exposed| exposed != id) {
                    review.admit(exposed);
                }
            }

            let state = progress(
                self.grid.get_mut(id),
                &mut self.stats,
                params,
                self.pathway.as_ref(),
                rng,
            );
            if !state.is_terminal() {
                review.retain(id);
            }
        }
        self.active.commit(review);

        outcome.quarantine_change = self
            .quarantine
            .update(&self.stats, params.quarantine_threshold);
        self.stats.quarantine_active = self.quarantine.is_active();
        outcome
    }

    fn daily_contacts<R: Rng + ?Sized>(
        &self,
        id: CitizenId,
        params: &Parameters,
        rng: &mut R,
    ) -> Vec<CitizenId> {
        if self.quarantine.is_active() {
            return Vec::new();
        }
        let citizen = self.grid.get(id);
        if citizen.self_isolated && percent_chance(rng, params.self_isolation_strictness) {
            return Vec::new();
        }
        let budget = contact_budget(
            params.maximum_contacts_per_day,
            params.contact_modifier(citizen.state),
        );
        sample_contacts(&self.grid, citizen, params.maximum_travel_range, budget, rng)
    }
}

define_rng!(PopulationRng);
define_rng!(EpidemicRng);

const NOT_INITIALIZED: &str = "The epidemic has not been initialized";

define_data_plugin!(EpidemicPlugin, RefCell<Option<Epidemic>>, RefCell::new(None));

fn epidemic_mut(context: &Context) -> RefMut<'_, Epidemic> {
    let cell = context
        .get_data_container(EpidemicPlugin)
        .expect(NOT_INITIALIZED);
    RefMut::map(cell.borrow_mut(), |epidemic| {
        epidemic.as_mut().expect(NOT_INITIALIZED)
    })
}

fn finish(context: &Context, termination: Termination) {
    let mut epidemic = epidemic_mut(context);
    epidemic.termination = Some(termination);
    info!("Simulation ended ({termination:?})\n{}", epidemic.stats);
}

fn run_day(context: &mut Context) {
    let outcome = {
        let params = context.get_params();
        let mut epidemic = epidemic_mut(context);
        context.sample(EpidemicRng, |rng| epidemic.step_day(params, rng))
    };

    let (stats, active) = {
        let epidemic = context.epidemic();
        (*epidemic.stats(), epidemic.active_cases().len())
    };
    debug!(
        "Day {}: {active} active, {} dead, {} recovered",
        stats.days_count, stats.total_dead, stats.total_recovered
    );
    if let Some(years) = outcome.year_passed {
        info!("Year {years} passed");
    }
    match outcome.quarantine_change {
        Some(QuarantineChange::Engaged) => {
            info!("Day {}: total quarantine applied", stats.days_count);
        }
        Some(QuarantineChange::Lifted) => {
            info!("Day {}: total quarantine lifted", stats.days_count);
        }
        None => {}
    }

    let max_days = context.get_params().max_days;
    if active == 0 {
        finish(context, Termination::Resolved);
    } else if max_days.is_some_and(|last| stats.days_count >= last) {
        finish(context, Termination::HorizonReached);
    } else {
        let next_day = context.get_current_time() + 1.0;
        context.add_plan(next_day, run_day);
    }
}

pub trait ContextEpidemicExt {
    /// Builds the population, seeds `InitialInfections` ill citizens and
    /// schedules the first day. Parameters and the random seed must be set.
    fn init_epidemic(&mut self);

    /// Like [`init_epidemic`](Self::init_epidemic), with a custom care
    /// pathway for ill citizens.
    fn init_epidemic_with_pathway(&mut self, pathway: Box<dyn CarePathway>);

    /// # Panics
    ///
    /// Panics if the epidemic has not been initialized.
    fn epidemic(&self) -> Ref<'_, Epidemic>;

    /// A snapshot of the current counters.
    fn get_stats(&self) -> SimulationStats;

    /// `Some` once the day loop has stopped.
    fn epidemic_termination(&self) -> Option<Termination>;
}

impl ContextEpidemicExt for Context {
    fn init_epidemic(&mut self) {
        self.init_epidemic_with_pathway(Box::new(SelfCare));
    }

    fn init_epidemic_with_pathway(&mut self, pathway: Box<dyn CarePathway>) {
        let (epidemic, max_days) = {
            let params = self.get_params();
            let epidemic = self.sample(PopulationRng, |rng| {
                let mut epidemic = Epidemic::new(params, rng).with_pathway(pathway);
                epidemic.seed_random(params.initial_infections, rng);
                epidemic
            });
            (epidemic, params.max_days)
        };
        info!(
            "Population of {} on a {side}x{side} grid, {} initial cases",
            epidemic.grid.len(),
            epidemic.active.len(),
            side = epidemic.grid.side(),
        );
        let resolved = epidemic.active.is_empty();
        *self.get_data_container_mut(EpidemicPlugin).get_mut() = Some(epidemic);

        if resolved {
            finish(self, Termination::Resolved);
        } else if max_days == Some(0) {
            finish(self, Termination::HorizonReached);
        } else {
            let first_day = self.get_current_time() + 1.0;
            self.add_plan(first_day, run_day);
        }
    }

    fn epidemic(&self) -> Ref<'_, Epidemic> {
        let cell = self
            .get_data_container(EpidemicPlugin)
            .expect(NOT_INITIALIZED);
        Ref::map(cell.borrow(), |epidemic| {
            epidemic.as_ref().expect(NOT_INITIALIZED)
        })
    }

    fn get_stats(&self) -> SimulationStats {
        *self.epidemic().stats()
    }

    fn epidemic_termination(&self) -> Option<Termination> {
        self.epidemic().termination()
    }
}
