//! Model parameters.
//!
//! Parameters are read from a JSON object with PascalCase keys. Every key is
//! optional: absent scalars are 0, and the tables (contact modifiers, age
//! bands, severity distribution, mortality by age) together with `GridSide`,
//! `InitialInfections` and `MaxDays` fall back to the built-in defaults of
//! [`Parameters::default`].
use std::collections::BTreeMap;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::define_global_property;
use crate::epidemic::citizen::{HealthState, SeverityLevel};
use crate::error::EpiError;
use crate::global_properties::ContextGlobalPropertiesExt;

/// One row of the cumulative age table: `density` percent of the population
/// is younger than `upper_bound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgeBand {
    pub upper_bound: u32,
    pub density: u32,
}

impl AgeBand {
    #[must_use]
    pub const fn new(upper_bound: u32, density: u32) -> AgeBand {
        AgeBand {
            upper_bound,
            density,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Parameters {
    pub grid_side: usize,
    pub initial_infections: usize,
    /// Last simulated day. `None` runs until no active case is left.
    pub max_days: Option<u32>,

    pub infection_rate: u32,
    pub transition_rate: u32,
    pub mortality_rate: u32,
    pub maximum_contacts_per_day: u32,
    pub maximum_travel_range: usize,
    pub gray_period: u32,
    pub self_recovery_rate: u32,
    pub days_before_self_recovery: u32,
    pub healthcare_capacity: usize,
    pub self_isolation_rate: u32,
    pub self_isolation_strictness: u32,
    #[serde(alias = "TotalQuarantineAppliedTreshold")]
    pub quarantine_threshold: u32,
    pub base_hospitality: u32,

    pub severity_level_distribution: BTreeMap<SeverityLevel, u32>,
    pub contacts_per_day_modifiers: BTreeMap<HealthState, f64>,
    /// Mortality percentage keyed by the oldest age of each group.
    pub mortality_among_age_groups: BTreeMap<u32, f64>,
    pub age_groups_density: Vec<AgeBand>,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            grid_side: 50,
            initial_infections: 1,
            max_days: Some(3650),
            infection_rate: 0,
            transition_rate: 0,
            mortality_rate: 0,
            maximum_contacts_per_day: 0,
            maximum_travel_range: 0,
            gray_period: 0,
            self_recovery_rate: 0,
            days_before_self_recovery: 0,
            healthcare_capacity: 0,
            self_isolation_rate: 0,
            self_isolation_strictness: 0,
            quarantine_threshold: 0,
            base_hospitality: 0,
            severity_level_distribution: BTreeMap::from([
                (SeverityLevel::Critical, 4),
                (SeverityLevel::Severe, 10),
                (SeverityLevel::Mild, 56),
                (SeverityLevel::Low, 30),
            ]),
            contacts_per_day_modifiers: BTreeMap::from([
                (HealthState::Healthy, 1.0),
                (HealthState::Susceptible, 0.5),
                (HealthState::Infected, 0.5),
                (HealthState::Ill, 0.5),
                (HealthState::UnderTreatment, 0.06),
                (HealthState::ICU, 0.01),
                (HealthState::Recovered, 1.0),
                (HealthState::Dead, 0.0),
            ]),
            mortality_among_age_groups: BTreeMap::from([
                (9, 0.0),
                (39, 0.2),
                (49, 0.4),
                (59, 1.3),
                (69, 3.6),
                (79, 8.0),
                (99, 14.8),
            ]),
            age_groups_density: vec![
                AgeBand::new(10, 3),
                AgeBand::new(25, 16),
                AgeBand::new(40, 48),
                AgeBand::new(75, 87),
                AgeBand::new(100, 100),
            ],
        }
    }
}

impl Parameters {
    /// Checks the structural constraints the model relies on.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigError` naming the first offending field.
    pub fn validate(&self) -> Result<(), EpiError> {
        if self.grid_side == 0 {
            return Err(EpiError::ConfigError("GridSide must be positive".to_string()));
        }
        if self.initial_infections > self.population() {
            return Err(EpiError::ConfigError(format!(
                "InitialInfections ({}) exceeds the population ({})",
                self.initial_infections,
                self.population()
            )));
        }
        if let Some((state, value)) = self
            .contacts_per_day_modifiers
            .iter()
            .find(|(_, value)| !value.is_finite() || **value < 0.0)
        {
            return Err(EpiError::ConfigError(format!(
                "ContactsPerDayModifiers[{state}] must be a non-negative number, got {value}"
            )));
        }
        self.validate_age_bands()
    }

    fn validate_age_bands(&self) -> Result<(), EpiError> {
        let Some(last) = self.age_groups_density.last() else {
            return Err(EpiError::ConfigError(
                "AgeGroupsDensity must not be empty".to_string(),
            ));
        };
        for pair in self.age_groups_density.windows(2) {
            if pair[1].upper_bound <= pair[0].upper_bound || pair[1].density < pair[0].density {
                return Err(EpiError::ConfigError(format!(
                    "AgeGroupsDensity must be increasing, got {:?} after {:?}",
                    pair[1], pair[0]
                )));
            }
        }
        if last.density != 100 {
            return Err(EpiError::ConfigError(format!(
                "AgeGroupsDensity must end at density 100, got {}",
                last.density
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.grid_side * self.grid_side
    }

    /// Contact budget multiplier for `state`. A state without an entry gets no
    /// contacts.
    #[must_use]
    pub fn contact_modifier(&self, state: HealthState) -> f64 {
        self.contacts_per_day_modifiers
            .get(&state)
            .copied()
            .unwrap_or(0.0)
    }

    /// Mortality percentage of the first age group whose upper bound is at
    /// least `age`, or `None` past the oldest group.
    #[must_use]
    pub fn mortality_for_age(&self, age: u32) -> Option<f64> {
        self.mortality_among_age_groups
            .range(age..)
            .next()
            .map(|(_, mortality)| *mortality)
    }

    /// Mortality rate for the day: doubled once the number of infected
    /// reaches healthcare capacity.
    #[must_use]
    pub fn current_mortality(&self, total_infected: usize) -> u32 {
        if total_infected >= self.healthcare_capacity {
            self.mortality_rate.saturating_mul(2)
        } else {
            self.mortality_rate
        }
    }
}

define_global_property!(Params, Parameters, Parameters::validate);

pub trait ContextParametersExt {
    /// Loads parameters from the JSON file at `path`. A file that is missing,
    /// malformed or invalid is reported with a warning and the defaults are
    /// used instead.
    ///
    /// # Errors
    ///
    /// Returns an `EpiError` only if the parameters can't be stored.
    fn init_parameters(&mut self, path: &Path) -> Result<(), EpiError>;

    /// # Panics
    ///
    /// Panics if the parameters have not been initialized.
    fn get_params(&self) -> &Parameters;
}

impl ContextParametersExt for Context {
    fn init_parameters(&mut self, path: &Path) -> Result<(), EpiError> {
        match self.load_global_property_from_file(Params, path) {
            Ok(()) => {
                info!("Loaded parameters from {}", path.display());
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Could not load parameters from {}: {e}. Using defaults.",
                    path.display()
                );
                self.set_global_property_value(Params, Parameters::default())
            }
        }
    }

    fn get_params(&self) -> &Parameters {
        self.get_global_property_value(Params)
            .expect("Parameters have not been initialized")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{json}").unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let params = Parameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.population(), 2500);
        assert_eq!(params.infection_rate, 0);
        assert_eq!(params.age_groups_density.len(), 5);
    }

    #[test]
    fn partial_json_keeps_table_defaults() {
        let params: Parameters = serde_json::from_str(
            r#"{"InfectionRate": 30, "TotalQuarantineAppliedTreshold": 12, "GridSide": 10}"#,
        )
        .unwrap();
        assert_eq!(params.infection_rate, 30);
        assert_eq!(params.quarantine_threshold, 12);
        assert_eq!(params.grid_side, 10);
        assert_eq!(params.mortality_rate, 0);
        assert_eq!(params.contact_modifier(HealthState::Ill), 0.5);
        assert_eq!(params.max_days, Some(3650));
    }

    #[test]
    fn tables_decode_from_json() {
        let params: Parameters = serde_json::from_str(
            r#"{
                "ContactsPerDayModifiers": {"healthy": 0.8, "ill": 0.25},
                "MortalityAmongAgeGroups": {"50": 1.0, "120": 5.0},
                "SeverityLevelDistribution": {"Low": 70, "Critical": 30},
                "AgeGroupsDensity": [{"UpperBound": 50, "Density": 40}, {"UpperBound": 90, "Density": 100}],
                "MaxDays": null
            }"#,
        )
        .unwrap();
        assert_eq!(params.contact_modifier(HealthState::Healthy), 0.8);
        assert_eq!(params.contact_modifier(HealthState::Recovered), 0.0);
        assert_eq!(params.mortality_for_age(60), Some(5.0));
        assert_eq!(
            params.severity_level_distribution.get(&SeverityLevel::Critical),
            Some(&30)
        );
        assert_eq!(params.age_groups_density[0], AgeBand::new(50, 40));
        assert_eq!(params.max_days, None);
    }

    #[test]
    fn mortality_lookup_by_age() {
        let params = Parameters::default();
        assert_eq!(params.mortality_for_age(0), Some(0.0));
        assert_eq!(params.mortality_for_age(9), Some(0.0));
        assert_eq!(params.mortality_for_age(25), Some(0.2));
        assert_eq!(params.mortality_for_age(72), Some(8.0));
        assert_eq!(params.mortality_for_age(100), None);
    }

    #[test]
    fn mortality_doubles_at_capacity() {
        let params = Parameters {
            mortality_rate: 3,
            healthcare_capacity: 10,
            ..Parameters::default()
        };
        assert_eq!(params.current_mortality(9), 3);
        assert_eq!(params.current_mortality(10), 6);
        assert_eq!(params.current_mortality(400), 6);

        let extreme = Parameters {
            mortality_rate: u32::MAX,
            ..Parameters::default()
        };
        assert_eq!(extreme.current_mortality(usize::MAX), u32::MAX);
    }

    #[test]
    fn validation_rejects_bad_tables() {
        let empty_grid = Parameters {
            grid_side: 0,
            ..Parameters::default()
        };
        assert!(matches!(empty_grid.validate(), Err(EpiError::ConfigError(_))));

        let too_many_seeds = Parameters {
            grid_side: 2,
            initial_infections: 5,
            ..Parameters::default()
        };
        assert!(too_many_seeds.validate().is_err());

        let unsorted = Parameters {
            age_groups_density: vec![AgeBand::new(40, 50), AgeBand::new(20, 100)],
            ..Parameters::default()
        };
        assert!(unsorted.validate().is_err());

        let short = Parameters {
            age_groups_density: vec![AgeBand::new(40, 50), AgeBand::new(80, 90)],
            ..Parameters::default()
        };
        assert!(short.validate().is_err());

        let mut negative = Parameters::default();
        negative
            .contacts_per_day_modifiers
            .insert(HealthState::Ill, -1.0);
        assert!(negative.validate().is_err());
    }

    #[test]
    fn init_parameters_from_file() {
        let file = write_config(r#"{"TransitionRate": 55, "GridSide": 8}"#);
        let mut context = Context::new();
        context.init_parameters(file.path()).unwrap();
        assert_eq!(context.get_params().transition_rate, 55);
        assert_eq!(context.get_params().population(), 64);
    }

    #[test]
    fn init_parameters_falls_back_to_defaults() {
        let mut context = Context::new();
        context
            .init_parameters(Path::new("does/not/exist.json"))
            .unwrap();
        assert_eq!(context.get_params(), &Parameters::default());

        let malformed = write_config("{ \"InfectionRate\": ");
        let mut context = Context::new();
        context.init_parameters(malformed.path()).unwrap();
        assert_eq!(context.get_params(), &Parameters::default());

        let invalid = write_config(r#"{"GridSide": 0, "InfectionRate": 70}"#);
        let mut context = Context::new();
        context.init_parameters(invalid.path()).unwrap();
        assert_eq!(context.get_params().infection_rate, 0);
    }

    #[test]
    #[should_panic(expected = "Parameters have not been initialized")]
    fn get_params_before_init() {
        let context = Context::new();
        let _ = context.get_params();
    }
}
