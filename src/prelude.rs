pub use crate::context::{Context, ExecutionPhase};
pub use crate::epidemic::{
    CitizenId, ContextEpidemicExt, ContextParametersExt, HealthState, Parameters, SimulationStats,
};
pub use crate::error::EpiError;
pub use crate::global_properties::ContextGlobalPropertiesExt;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::random::ContextRandomExt;
pub use crate::report::ContextReportExt;
pub use crate::{define_data_plugin, define_global_property, define_report, define_rng};
