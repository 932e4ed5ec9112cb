use anyhow::Result;
use bmk::commands::{custom, stages};
use bmk::runner::CancelToken;

use super::types::{Commands, GlobalArgs};

/// Run the selected subcommand, returning the process exit code
pub fn dispatch(global: &GlobalArgs, command: Commands, cancel: CancelToken) -> Result<i32> {
    let options = global.run_options();
    match command {
        Commands::Stages { prefix, args } => stages::execute(&options, &prefix, args, cancel),
        Commands::Test { args } => stages::execute(&options, stages::TEST_PREFIX, args, cancel),
        Commands::Build { args } => stages::execute(&options, stages::BUILD_PREFIX, args, cancel),
        Commands::Clean { args } => stages::execute(&options, stages::CLEAN_PREFIX, args, cancel),
        Commands::Custom { name, args } => custom::execute(&options, &name, args, cancel),
    }
}
