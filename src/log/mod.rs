//! The `log` module configures the simulator's diagnostic logging. This is not to be confused with
//! _reporting_ (see [`crate::report`]), which records model data to CSV files.
//!
//! The module (re)exports the five logging macros `error!`, `warn!`, `info!`, `debug!` and
//! `trace!`. The epidemic model uses `info!` for its console notices (year rollover, quarantine
//! engaged or lifted, the end-of-run summary) and `trace!` for per-citizen detail.
//!
//! Logging is _disabled_ by default. It can be enabled from the command line with
//! `--log-level <spec>` or `-v`, or programmatically:
//!
//! ```rust
//! use grid_epi::log::{apply_log_spec, parse_log_spec};
//!
//! // Per-citizen transitions are logged at trace level.
//! let (global, modules) = parse_log_spec("info,grid_epi::epidemic::transmission=trace")?;
//! apply_log_spec(global, &modules);
//! # Ok::<(), grid_epi::EpiError>(())
//! ```
#[cfg(feature = "logging")]
mod standard_logger;

use std::collections::hash_map::Entry;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex, MutexGuard};

pub use log::{debug, error, info, trace, warn, LevelFilter};
#[cfg(feature = "logging")]
use log4rs::Handle;
use rustc_hash::FxHashMap;

use crate::error::EpiError;

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// A level filter for the log messages emitted from one module path
/// (e.g. `"grid_epi::epidemic"`).
#[derive(Debug, PartialEq)]
struct ModuleLogConfiguration {
    module: String,
    level: LevelFilter,
}

impl From<(&str, LevelFilter)> for ModuleLogConfiguration {
    fn from((module, level): (&str, LevelFilter)) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

/// Keeps track of the global and per-module filter levels and holds the handle to the installed
/// logger. Only the singleton behind the free functions below should exist.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// A global filter level of `LevelFilter::Off` disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    module_configurations: FxHashMap<String, ModuleLogConfiguration>,

    #[cfg(feature = "logging")]
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_configurations: FxHashMap::default(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.set_config();
    }

    /// Returns true if the configuration was mutated, false otherwise.
    fn insert_module_filter(&mut self, module: &str, level: LevelFilter) -> bool {
        match self.module_configurations.entry(module.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().level == level {
                    return false;
                }
                entry.get_mut().level = level;
            }
            Entry::Vacant(entry) => {
                entry.insert((module, level).into());
            }
        }
        true
    }

    fn set_module_filters(&mut self, module_filters: &[(String, LevelFilter)]) {
        let mut mutated = false;
        for (module, level) in module_filters {
            mutated |= self.insert_module_filter(module, *level);
        }
        if mutated {
            self.set_config();
        }
    }
}

/// Sets the global log level. A global filter level of `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    get_log_configuration().set_log_level(level);
}

/// Parses a log level specification such as `"info"` or
/// `"warn,grid_epi::epidemic=trace"`: bare levels set the global level and
/// `module=level` pairs add module filters.
///
/// # Errors
///
/// Returns `EpiError::ConfigError` if a level name is not recognized.
pub fn parse_log_spec(spec: &str) -> Result<(Option<LevelFilter>, Vec<(String, LevelFilter)>), EpiError> {
    let parse_level = |text: &str| {
        LevelFilter::from_str(text.trim())
            .map_err(|_| EpiError::ConfigError(format!("Unknown log level: {text}")))
    };

    let mut global = None;
    let mut modules = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('=') {
            Some((module, level)) => modules.push((module.trim().to_string(), parse_level(level)?)),
            None => global = Some(parse_level(part)?),
        }
    }
    Ok((global, modules))
}

/// Applies a spec parsed by [`parse_log_spec`]. Module filters without a global level imply a
/// global `Error` level so the filtered modules are actually emitted.
pub fn apply_log_spec(global: Option<LevelFilter>, modules: &[(String, LevelFilter)]) {
    let global = match (global, modules.is_empty()) {
        (Some(level), _) => level,
        (None, false) => LevelFilter::Error,
        (None, true) => return,
    };
    let mut configuration = get_log_configuration();
    configuration.set_module_filters(modules);
    configuration.set_log_level(global);
}

// Without the `logging` feature there is no logger to configure; only the
// `log` facade's own level filter applies.
#[cfg(not(feature = "logging"))]
impl LogConfiguration {
    fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}

fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}

#[cfg(test)]
mod tests {
    use std::sync::{LazyLock, Mutex};

    use log::{error, trace, LevelFilter};

    use super::*;

    // Force logging tests to run serially for consistent behavior.
    static TEST_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

    #[test]
    fn test_set_log_level() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_log_level(LevelFilter::Error);
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Error);
            error!("test_set_log_level: global set to error");
            trace!("test_set_log_level: NOT EMITTED");
        }
        set_log_level(LevelFilter::Trace);
        assert_eq!(get_log_configuration().global_log_level, LevelFilter::Trace);
        set_log_level(LevelFilter::Off);
        assert_eq!(get_log_configuration().global_log_level, LevelFilter::Off);
    }

    #[test]
    fn test_apply_log_spec_with_module_filters() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        apply_log_spec(
            None,
            &[
                ("grid_epi::epidemic".to_string(), LevelFilter::Debug),
                ("grid_epi::report".to_string(), LevelFilter::Warn),
            ],
        );
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Error);
            assert_eq!(
                config.module_configurations.get("grid_epi::epidemic"),
                Some(&("grid_epi::epidemic", LevelFilter::Debug).into())
            );
        }

        // Re-applying the same level leaves the filter untouched
        let mut config = get_log_configuration();
        assert!(!config.insert_module_filter("grid_epi::report", LevelFilter::Warn));
        assert!(config.insert_module_filter("grid_epi::report", LevelFilter::Trace));
        config.module_configurations.clear();
        config.set_log_level(LevelFilter::Off);
    }

    #[test]
    fn parse_global_and_module_levels() {
        let (global, modules) = parse_log_spec("info, grid_epi::epidemic=trace").unwrap();
        assert_eq!(global, Some(LevelFilter::Info));
        assert_eq!(
            modules,
            vec![("grid_epi::epidemic".to_string(), LevelFilter::Trace)]
        );
    }

    #[test]
    fn parse_rejects_unknown_level() {
        assert!(matches!(
            parse_log_spec("loud"),
            Err(EpiError::ConfigError(_))
        ));
    }
}
