//! The per-individual record kept in every cell of the population grid.
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Health states of a citizen.
///
/// Only `Healthy`, `Susceptible`, `Ill`, `Recovered` and `Dead` are reached
/// by the progression rules. `Infected`, `UnderTreatment` and `ICU` are part
/// of the model vocabulary (contact modifiers, reports) so that an
/// asymptomatic or hospital pathway can be added without reshaping the state
/// machine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "camelCase")]
pub enum HealthState {
    Healthy,
    /// Exposed, not yet symptomatic.
    Susceptible,
    /// Asymptomatic.
    Infected,
    /// Symptomatic.
    Ill,
    /// Hospitalized.
    UnderTreatment,
    #[serde(rename = "icu")]
    ICU,
    Recovered,
    Dead,
}

impl HealthState {
    /// Recovered and Dead are absorbing.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, HealthState::Recovered | HealthState::Dead)
    }

    /// States that pass the infection on to a healthy contact.
    #[must_use]
    pub fn is_contagious(self) -> bool {
        matches!(self, HealthState::Susceptible | HealthState::Ill)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Healthy => "healthy",
            HealthState::Susceptible => "susceptible",
            HealthState::Infected => "infected",
            HealthState::Ill => "ill",
            HealthState::UnderTreatment => "underTreatment",
            HealthState::ICU => "icu",
            HealthState::Recovered => "recovered",
            HealthState::Dead => "dead",
        }
    }
}

impl Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How hard the disease would hit a citizen, derived from the severity score
/// drawn at creation. Not consulted by the shipped progression rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeverityLevel {
    Low,
    Mild,
    Severe,
    Critical,
}

impl SeverityLevel {
    /// Maps a score in `0..4` to a level; larger scores saturate at `Critical`.
    #[must_use]
    pub fn from_score(score: u8) -> SeverityLevel {
        match score {
            0 => SeverityLevel::Low,
            1 => SeverityLevel::Mild,
            2 => SeverityLevel::Severe,
            _ => SeverityLevel::Critical,
        }
    }
}

/// A citizen is identified by its grid coordinates, which never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CitizenId {
    pub row: usize,
    pub col: usize,
}

impl CitizenId {
    #[must_use]
    pub fn new(row: usize, col: usize) -> CitizenId {
        CitizenId { row, col }
    }
}

impl Display for CitizenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Citizen {
    pub id: CitizenId,
    pub state: HealthState,
    /// Days since the last state change. Reset to 1 on every transition.
    pub days_in_state: u32,
    /// Set at illness onset by the isolation roll, never cleared.
    pub self_isolated: bool,
    /// Chance, in percent, that a neighbor is accepted as a contact.
    pub hospitality: u32,
    pub sickness_severity: u8,
    pub age: u32,
}

impl Citizen {
    /// A healthy citizen that has just been placed on the grid.
    #[must_use]
    pub fn new(id: CitizenId, hospitality: u32, sickness_severity: u8, age: u32) -> Citizen {
        Citizen {
            id,
            state: HealthState::Healthy,
            days_in_state: 0,
            self_isolated: false,
            hospitality,
            sickness_severity,
            age,
        }
    }

    pub fn transition(&mut self, state: HealthState) {
        self.state = state;
        self.days_in_state = 1;
    }

    #[must_use]
    pub fn severity_level(&self) -> SeverityLevel {
        SeverityLevel::from_score(self.sickness_severity)
    }
}
