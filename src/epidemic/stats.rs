//! Aggregate counters for a run.
use std::fmt::{self, Display};

use serde::Serialize;

use crate::epidemic::citizen::HealthState;

/// Counters maintained incrementally as citizens change state. `infected`
/// counts Susceptible citizens (exposed, not yet ill).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimulationStats {
    pub total_population: usize,
    pub total_intact: usize,
    pub total_infected: usize,
    pub total_ill: usize,
    pub total_recovered: usize,
    pub total_dead: usize,
    pub total_self_isolated: usize,
    pub total_hospitalized: usize,
    pub total_icu: usize,
    pub days_count: u32,
    pub current_mortality: u32,
    pub quarantine_active: bool,
}

impl SimulationStats {
    /// Counters for an all-healthy population.
    #[must_use]
    pub fn new(total_population: usize) -> SimulationStats {
        SimulationStats {
            total_population,
            total_intact: total_population,
            ..SimulationStats::default()
        }
    }

    fn bucket_mut(&mut self, state: HealthState) -> Option<&mut usize> {
        match state {
            HealthState::Healthy => Some(&mut self.total_intact),
            HealthState::Susceptible => Some(&mut self.total_infected),
            HealthState::Ill => Some(&mut self.total_ill),
            HealthState::UnderTreatment => Some(&mut self.total_hospitalized),
            HealthState::ICU => Some(&mut self.total_icu),
            HealthState::Recovered => Some(&mut self.total_recovered),
            HealthState::Dead => Some(&mut self.total_dead),
            HealthState::Infected => None,
        }
    }

    /// Moves one citizen from the `from` bucket to the `to` bucket.
    pub fn record_transition(&mut self, from: HealthState, to: HealthState) {
        if let Some(count) = self.bucket_mut(from) {
            *count -= 1;
        }
        if let Some(count) = self.bucket_mut(to) {
            *count += 1;
        }
    }

    /// Citizens that are still contagious.
    #[must_use]
    pub fn active_cases(&self) -> usize {
        self.total_infected + self.total_ill
    }

    /// Share of the population that is ill or dead, in whole percent.
    #[must_use]
    pub fn ill_or_dead_percent(&self) -> usize {
        if self.total_population == 0 {
            return 0;
        }
        (self.total_ill + self.total_dead) * 100 / self.total_population
    }

    /// Whether every citizen is accounted for in exactly one bucket.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_intact
            + self.total_infected
            + self.total_ill
            + self.total_hospitalized
            + self.total_icu
            + self.total_recovered
            + self.total_dead
            == self.total_population
    }
}

impl Display for SimulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Day: {}", self.days_count)?;
        writeln!(f, "Dead: {}", self.total_dead)?;
        writeln!(f, "Ill: {}", self.total_ill)?;
        writeln!(f, "Infected: {}", self.total_infected)?;
        writeln!(f, "Self-isolated: {}", self.total_self_isolated)?;
        writeln!(f, "Recovered: {}", self.total_recovered)?;
        writeln!(f, "Intact: {}", self.total_intact)?;
        write!(f, "Current mortality: {}%", self.current_mortality)
    }
}
