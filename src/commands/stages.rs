//! Run the staged scripts of a command prefix
//! Usage: bmk stages <PREFIX> [ARGS]...

use anyhow::Result;

use super::RunOptions;
use crate::runner::{CancelToken, RunCoordinator};

/// Prefix used by `bmk test`
pub const TEST_PREFIX: &str = "test";
/// Prefix used by `bmk build`
pub const BUILD_PREFIX: &str = "bld";
/// Prefix used by `bmk clean`
pub const CLEAN_PREFIX: &str = "clean";

/// Execute every stage for `prefix`, returning the process exit code
pub fn execute(
    options: &RunOptions,
    prefix: &str,
    args: Vec<String>,
    cancel: CancelToken,
) -> Result<i32> {
    let config = options.run_config(prefix, args)?;
    let outcome = RunCoordinator::new(cancel).run(&config)?;
    Ok(outcome.exit_code())
}
