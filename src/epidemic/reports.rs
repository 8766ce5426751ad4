//! CSV output: one row of aggregate counters per day, and a snapshot of every
//! citizen once the run ends.
use serde::{Deserialize, Serialize};

use crate::context::{Context, ExecutionPhase};
use crate::define_report;
use crate::epidemic::citizen::HealthState;
use crate::epidemic::parameters::ContextParametersExt;
use crate::epidemic::simulation::ContextEpidemicExt;
use crate::error::EpiError;
use crate::report::ContextReportExt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReportItem {
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Dead")]
    pub dead: usize,
    #[serde(rename = "Ill")]
    pub ill: usize,
    #[serde(rename = "Infected")]
    pub infected: usize,
    #[serde(rename = "Recovered")]
    pub recovered: usize,
    #[serde(rename = "Hospitalized")]
    pub hospitalized: usize,
    #[serde(rename = "On ICU")]
    pub on_icu: usize,
    #[serde(rename = "Healthcare capacity")]
    pub healthcare_capacity: usize,
    #[serde(rename = "Current mortality rate")]
    pub current_mortality_rate: u32,
    #[serde(rename = "Self-isolated")]
    pub self_isolated: usize,
}

define_report!(DailyReportItem);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationReportItem {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Days")]
    pub days: u32,
    #[serde(rename = "Hospitality")]
    pub hospitality: u32,
    #[serde(rename = "Self-Isolated")]
    pub self_isolated: bool,
    #[serde(rename = "Sickness severity")]
    pub sickness_severity: u8,
    #[serde(rename = "State")]
    pub state: HealthState,
}

define_report!(PopulationReportItem);

fn record_day(context: &mut Context) {
    let stats = context.get_stats();
    context.send_report(DailyReportItem {
        day: stats.days_count,
        dead: stats.total_dead,
        ill: stats.total_ill,
        infected: stats.total_infected,
        recovered: stats.total_recovered,
        hospitalized: stats.total_hospitalized,
        on_icu: stats.total_icu,
        healthcare_capacity: context.get_params().healthcare_capacity,
        current_mortality_rate: stats.current_mortality,
        self_isolated: stats.total_self_isolated,
    });

    if context.epidemic_termination().is_some() {
        record_population(context);
    } else {
        let next_day = context.get_current_time() + 1.0;
        context.add_plan_with_phase(next_day, record_day, ExecutionPhase::Last);
    }
}

fn record_population(context: &Context) {
    let rows: Vec<PopulationReportItem> = context
        .epidemic()
        .grid()
        .iter()
        .map(|citizen| PopulationReportItem {
            id: citizen.id.to_string(),
            age: citizen.age,
            days: citizen.days_in_state,
            hospitality: citizen.hospitality,
            self_isolated: citizen.self_isolated,
            sickness_severity: citizen.sickness_severity,
            state: citizen.state,
        })
        .collect();
    for row in rows {
        context.send_report(row);
    }
}

/// Creates `daily.csv` and `population.csv` and schedules the daily row,
/// starting with day 0, after each day's step.
///
/// # Errors
///
/// Returns an `EpiError` if a report file can't be created.
pub fn init(context: &mut Context) -> Result<(), EpiError> {
    context.add_report::<DailyReportItem>("daily")?;
    context.add_report::<PopulationReportItem>("population")?;
    let now = context.get_current_time();
    context.add_plan_with_phase(now, record_day, ExecutionPhase::Last);
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::epidemic::parameters::{Parameters, Params};
    use crate::global_properties::ContextGlobalPropertiesExt;
    use crate::random::ContextRandomExt;

    fn read_rows<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Vec<T> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader.deserialize().map(Result::unwrap).collect()
    }

    fn run(params: Parameters, dir: &std::path::Path) -> Context {
        let mut context = Context::new();
        context.init_random(4);
        context
            .report_options()
            .directory(dir.to_path_buf())
            .file_prefix("test_".to_string());
        context.set_global_property_value(Params, params).unwrap();
        init(&mut context).unwrap();
        context.init_epidemic();
        context.execute();
        context
    }

    #[test]
    fn one_daily_row_per_day_and_a_full_snapshot() {
        let dir = tempdir().unwrap();
        let params = Parameters {
            grid_side: 6,
            initial_infections: 2,
            transition_rate: 50,
            infection_rate: 50,
            mortality_rate: 10,
            healthcare_capacity: 7,
            self_recovery_rate: 60,
            days_before_self_recovery: 2,
            maximum_contacts_per_day: 4,
            maximum_travel_range: 1,
            base_hospitality: 30,
            quarantine_threshold: 50,
            ..Parameters::default()
        };
        let context = run(params, dir.path());
        let stats = context.get_stats();

        let daily: Vec<DailyReportItem> = read_rows(&dir.path().join("test_daily.csv"));
        assert_eq!(daily.len(), stats.days_count as usize + 1);
        assert_eq!(daily[0].day, 0);
        assert_eq!(daily[0].ill, 2);
        assert!(daily.iter().all(|row| row.healthcare_capacity == 7));
        let last = daily.last().unwrap();
        assert_eq!(last.day, stats.days_count);
        assert_eq!(last.dead, stats.total_dead);
        assert_eq!(last.recovered, stats.total_recovered);

        let population: Vec<PopulationReportItem> =
            read_rows(&dir.path().join("test_population.csv"));
        assert_eq!(population.len(), 36);
        assert_eq!(population[7].id, "[1, 1]");
        let dead = population
            .iter()
            .filter(|row| row.state == HealthState::Dead)
            .count();
        assert_eq!(dead, stats.total_dead);
    }

    #[test]
    fn headers_match_the_column_names() {
        let dir = tempdir().unwrap();
        let params = Parameters {
            grid_side: 2,
            initial_infections: 0,
            ..Parameters::default()
        };
        run(params, dir.path());

        let daily = std::fs::read_to_string(dir.path().join("test_daily.csv")).unwrap();
        assert!(daily.starts_with(
            "Day,Dead,Ill,Infected,Recovered,Hospitalized,On ICU,Healthcare capacity,\
             Current mortality rate,Self-isolated\n0,0,0,0,0,0,0,0,0,0\n"
        ));
        let population =
            std::fs::read_to_string(dir.path().join("test_population.csv")).unwrap();
        let mut lines = population.lines();
        assert_eq!(
            lines.next(),
            Some("ID,Age,Days,Hospitality,Self-Isolated,Sickness severity,State")
        );
        assert_eq!(lines.count(), 4);
        assert!(population.contains(",healthy"));
    }

    #[test]
    fn existing_reports_are_not_overwritten() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("daily.csv"), "keep me").unwrap();
        let mut context = Context::new();
        context
            .report_options()
            .directory(dir.path().to_path_buf());
        assert!(matches!(init(&mut context), Err(EpiError::ReportError(_))));
    }
}
