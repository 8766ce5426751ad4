//! Pairwise transmission and the daily progression of a citizen's own state.
//!
//! ```text
//! Healthy -> Susceptible      contact with Ill/Susceptible, TransitionRate%
//! Susceptible -> Ill          days_in_state >= GrayPeriod, InfectionRate%
//! Susceptible -> Recovered    days_in_state >= DaysBeforeSelfRecovery, SelfRecoveryRate%
//! Ill -> Dead                 current mortality%, every day while Ill
//! Ill -> Recovered            days_in_state >= DaysBeforeSelfRecovery, (SelfRecoveryRate/2)%
//! ```
use log::trace;
use rand::Rng;

use crate::epidemic::citizen::{Citizen, CitizenId, HealthState, SeverityLevel};
use crate::epidemic::parameters::Parameters;
use crate::epidemic::population::PopulationGrid;
use crate::epidemic::stats::SimulationStats;
use crate::random::percent_chance;

/// Decides whether an ill citizen needs a higher level of care, and when a
/// citizen in care leaves it.
///
/// The progression rules only cover Susceptible and Ill, so a citizen moved
/// to UnderTreatment or ICU stays active until the pathway moves it on (to
/// Recovered, Dead or back to Ill). A pathway that never does keeps the run
/// going until `MaxDays`.
pub trait CarePathway {
    /// Called once a day for every citizen that stayed Ill and for every
    /// citizen UnderTreatment or in ICU. Returning a state moves the citizen
    /// there.
    fn escalate(
        &self,
        citizen: &Citizen,
        severity: SeverityLevel,
        params: &Parameters,
    ) -> Option<HealthState>;
}

/// Everyone recovers (or not) at home.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfCare;

impl CarePathway for SelfCare {
    fn escalate(&self, _: &Citizen, _: SeverityLevel, _: &Parameters) -> Option<HealthState> {
        None
    }
}

fn change_state(citizen: &mut Citizen, stats: &mut SimulationStats, to: HealthState) {
    trace!("{}: {} -> {to}", citizen.id, citizen.state);
    stats.record_transition(citizen.state, to);
    citizen.transition(to);
}

/// Contact between `person` and `contact`. If exactly one of them is
/// contagious and the other healthy, the healthy one becomes Susceptible
/// with `transition_rate` percent chance. Returns the newly exposed citizen.
pub fn expose<R: Rng + ?Sized>(
    grid: &mut PopulationGrid,
    stats: &mut SimulationStats,
    person: CitizenId,
    contact: CitizenId,
    transition_rate: u32,
    rng: &mut R,
) -> Option<CitizenId> {
    let person_state = grid.get(person).state;
    let contact_state = grid.get(contact).state;
    if contact_state.is_terminal() {
        return None;
    }

    let target = if person_state.is_contagious() && contact_state == HealthState::Healthy {
        contact
    } else if contact_state.is_contagious() && person_state == HealthState::Healthy {
        person
    } else {
        return None;
    };

    if !percent_chance(rng, transition_rate) {
        return None;
    }
    change_state(grid.get_mut(target), stats, HealthState::Susceptible);
    Some(target)
}

/// Applies the first matching progression rule to `citizen` and returns its
/// resulting state. Rules are tried in order:
///
/// 1. Ill, and the death roll succeeds: Dead.
/// 2. Susceptible past the gray period: Ill on the infection roll, and on
///    onset a one-time self-isolation roll.
/// 3. Ill past `days_before_self_recovery`: Recovered at half the self
///    recovery rate.
/// 4. Susceptible past `days_before_self_recovery`: Recovered at the self
///    recovery rate.
///
/// A rule whose guard matches ends the evaluation even if its roll fails.
/// A citizen still Ill afterwards, or already in care, is offered to
/// `pathway`.
pub fn progress<R: Rng + ?Sized>(
    citizen: &mut Citizen,
    stats: &mut SimulationStats,
    params: &Parameters,
    pathway: &dyn CarePathway,
    rng: &mut R,
) -> HealthState {
    let before = citizen.state;
    let days = citizen.days_in_state;

    match citizen.state {
        HealthState::Ill if percent_chance(rng, stats.current_mortality) => {
            change_state(citizen, stats, HealthState::Dead);
        }
        HealthState::Susceptible if days >= params.gray_period => {
            if percent_chance(rng, params.infection_rate) {
                change_state(citizen, stats, HealthState::Ill);
                if percent_chance(rng, params.self_isolation_rate) {
                    citizen.self_isolated = true;
                    stats.total_self_isolated += 1;
                }
            }
        }
        HealthState::Ill if days >= params.days_before_self_recovery => {
            if percent_chance(rng, params.self_recovery_rate / 2) {
                change_state(citizen, stats, HealthState::Recovered);
            }
        }
        HealthState::Susceptible if days >= params.days_before_self_recovery => {
            if percent_chance(rng, params.self_recovery_rate) {
                change_state(citizen, stats, HealthState::Recovered);
            }
        }
        _ => {}
    }

    let in_care = matches!(citizen.state, HealthState::UnderTreatment | HealthState::ICU);
    if in_care || (before == HealthState::Ill && citizen.state == HealthState::Ill) {
        if let Some(next) = pathway.escalate(citizen, citizen.severity_level(), params) {
            change_state(citizen, stats, next);
        }
    }
    citizen.state
}
