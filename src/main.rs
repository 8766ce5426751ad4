use std::process::ExitCode;

use grid_epi::epidemic::{self, ContextEpidemicExt, ContextParametersExt};
use grid_epi::runner::run_with_args;

fn main() -> ExitCode {
    let result = run_with_args(|context, args| {
        context.init_parameters(&args.config)?;
        epidemic::init(context)
    });

    match result {
        Ok(context) => {
            println!("{}", context.get_stats());
            println!("End of simulation");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Simulation failed: {e}");
            ExitCode::FAILURE
        }
    }
}
