use std::path::PathBuf;

use clap::{ArgAction, Args, Command, FromArgMatches as _};
use log::LevelFilter;

use crate::context::Context;
use crate::error::EpiError;
use crate::log::{apply_log_spec, parse_log_spec, set_log_level};
use crate::random::ContextRandomExt;
use crate::report::ContextReportExt;

/// Default cli arguments for the simulation runner
#[derive(Args, Debug, Clone)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Path of the JSON parameters file
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Optional path for report output
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Optional prefix for report file names
    #[arg(long = "prefix", default_value = "")]
    pub file_prefix: String,

    /// Overwrite existing report files
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Log level spec, e.g. `info` or `warn,grid_epi::epidemic=trace`
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Default for BaseArgs {
    fn default() -> Self {
        BaseArgs {
            random_seed: 0,
            config: PathBuf::from("config.json"),
            output_dir: None,
            file_prefix: String::new(),
            force_overwrite: false,
            log_level: None,
            verbose: 0,
        }
    }
}

fn create_cli() -> Command {
    let cli = Command::new("grid-epi").about("Agent-based epidemic simulation on a toroidal grid");
    BaseArgs::augment_args(cli)
}

fn configure_logging(args: &BaseArgs) -> Result<(), EpiError> {
    if let Some(spec) = &args.log_level {
        let (global, modules) = parse_log_spec(spec)?;
        apply_log_spec(global, &modules);
        return Ok(());
    }
    match args.verbose {
        0 => {}
        1 => set_log_level(LevelFilter::Info),
        2 => set_log_level(LevelFilter::Debug),
        _ => set_log_level(LevelFilter::Trace),
    }
    Ok(())
}

/// Runs a simulation with the default cli arguments.
///
/// # Parameters
/// - `setup_fn`: A function that takes a mutable reference to a `Context` and the parsed
///   `BaseArgs`, and schedules the model
///
/// # Errors
/// Returns an error if argument parsing or the setup function fails
pub fn run_with_args<F>(setup_fn: F) -> Result<Context, Box<dyn std::error::Error>>
where
    F: FnOnce(&mut Context, &BaseArgs) -> Result<(), EpiError>,
{
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    Ok(run_with_args_internal(&args, setup_fn)?)
}

/// Builds a `Context` from `args`, hands it to `setup_fn` and executes it.
///
/// # Errors
/// Returns an error if the log spec is invalid or the setup function fails
pub fn run_with_args_internal<F>(args: &BaseArgs, setup_fn: F) -> Result<Context, EpiError>
where
    F: FnOnce(&mut Context, &BaseArgs) -> Result<(), EpiError>,
{
    configure_logging(args)?;

    let mut context = Context::new();

    let report_config = context.report_options();
    report_config
        .file_prefix(args.file_prefix.clone())
        .overwrite(args.force_overwrite);
    if let Some(output_dir) = &args.output_dir {
        report_config.directory(output_dir.clone());
    }

    context.init_random(args.random_seed);

    setup_fn(&mut context, args)?;

    context.execute();
    Ok(context)
}
