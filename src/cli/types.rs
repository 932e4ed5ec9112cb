use bmk::validation::clap_command_name_validator;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use bmk::commands::RunOptions;

#[derive(Parser)]
#[command(name = "bmk")]
#[command(about = "Staged parallel script runner", long_about = None)]
#[command(version)]
#[command(subcommand_help_heading = "Commands")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Project directory scripts run in (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Directory holding the bundled stage scripts
    #[arg(long, global = true, value_name = "DIR")]
    pub stages_dir: Option<PathBuf>,

    /// Per-project override directory (default: <project>/makescripts)
    #[arg(long, global = true, value_name = "DIR")]
    pub override_dir: Option<PathBuf>,

    /// Don't surface warnings from passing parallel scripts
    #[arg(long, global = true)]
    pub no_warnings: bool,

    /// Ask scripts for human-readable output instead of JSON
    #[arg(long, global = true)]
    pub human: bool,

    /// Terminate any script running longer than this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            project_dir: self.project_dir.clone(),
            stages_dir: self.stages_dir.clone(),
            override_dir: self.override_dir.clone(),
            no_warnings: self.no_warnings,
            human: self.human,
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every stage for a script prefix
    Stages {
        /// Script prefix (matches <PREFIX>_<NN>_*.<ext>)
        #[arg(value_parser = clap_command_name_validator)]
        prefix: String,

        /// Arguments forwarded to every script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the test stages (prefix "test")
    #[command(visible_alias = "t")]
    Test {
        /// Arguments forwarded to every script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the build stages (prefix "bld")
    #[command(visible_aliases = ["bld", "b"])]
    Build {
        /// Arguments forwarded to every script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the clean stages (prefix "clean")
    Clean {
        /// Arguments forwarded to every script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a project command that exists only in the override directory
    Custom {
        /// Command name (letters, digits, '-' and '_'; starts with a letter or digit)
        name: String,

        /// Arguments forwarded to every script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}
