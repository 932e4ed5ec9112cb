//! Run a project-defined command that only exists in the override directory
//! Usage: bmk custom <NAME> [ARGS]...

use anyhow::Result;

use super::RunOptions;
use crate::config::RunConfig;
use crate::discovery::{ScriptLocator, StagePattern};
use crate::error::BmkError;
use crate::runner::{CancelToken, RunCoordinator};
use crate::validation::validate_command_name;

/// Execute custom command `name`, returning the process exit code
pub fn execute(
    options: &RunOptions,
    name: &str,
    args: Vec<String>,
    cancel: CancelToken,
) -> Result<i32> {
    validate_command_name(name)?;
    let config = custom_config(options.run_config(name, args)?)?;
    let outcome = RunCoordinator::new(cancel).run(&config)?;
    Ok(outcome.exit_code())
}

/// Point the run at the override directory, which must hold `name`'s scripts.
pub fn custom_config(mut config: RunConfig) -> Result<RunConfig, BmkError> {
    let override_dir = config
        .override_dir
        .clone()
        .unwrap_or_else(|| crate::config::default_override_dir(&config.project_dir));

    if !override_dir.is_dir() {
        return Err(BmkError::OverrideDirMissing { path: override_dir });
    }

    let pattern = StagePattern::new(&config.command_prefix, &config.script_extension)?;
    if !ScriptLocator::new(&override_dir, pattern).has_scripts()? {
        return Err(BmkError::CustomCommandNotFound {
            name: config.command_prefix.clone(),
            dir: override_dir,
        });
    }

    tracing::debug!(
        name = %config.command_prefix,
        dir = %override_dir.display(),
        "running custom command"
    );
    config.bundled_dir = override_dir.clone();
    config.override_dir = Some(override_dir);
    Ok(config)
}
