//! Running every stage of a command prefix in order

use crate::config::RunConfig;
use crate::discovery::{resolve_stages_dir, ScriptLocator, StagePattern};
use crate::error::{BmkError, Result};

use super::cancel::CancelToken;
use super::executor::StageExecutor;
use super::metadata::{ManifestMetadata, MetadataProvider, PackageMetadata};
use super::report::{self, Explainer};
use super::result::{RunOutcome, StageOutcome};
use super::spawner::{ScriptEnv, ScriptSpawner, ShellSpawner};

/// Drives one invocation: resolve, discover, then run stages ascending,
/// stopping after the first stage with a failure.
pub struct RunCoordinator {
    cancel: CancelToken,
    spawner: Option<Box<dyn ScriptSpawner>>,
    metadata: Box<dyn MetadataProvider>,
}

impl RunCoordinator {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            cancel,
            spawner: None,
            metadata: Box::new(ManifestMetadata),
        }
    }

    /// Replace the default spawner, which is built from the run's shell
    pub fn with_spawner(mut self, spawner: Box<dyn ScriptSpawner>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    pub fn with_metadata(mut self, metadata: Box<dyn MetadataProvider>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Run all stages for `config.command_prefix`.
    ///
    /// Errors are configuration problems found before any script starts.
    /// Script failures and interrupts are reported through [`RunOutcome`].
    pub fn run(self, config: &RunConfig) -> Result<RunOutcome> {
        check_inputs(config)?;

        let pattern = StagePattern::new(&config.command_prefix, &config.script_extension)?;
        let source = resolve_stages_dir(
            &config.bundled_dir,
            config.override_dir.as_deref(),
            &pattern,
        )?;
        tracing::info!(
            prefix = %config.command_prefix,
            dir = %source.dir().display(),
            is_override = source.is_override(),
            "resolved stages directory"
        );

        let metadata = PackageMetadata::new(
            &config.project_dir,
            config.package_name.clone(),
            self.metadata,
        );
        let env = ScriptEnv::for_run(config, source.dir(), metadata.package_name());

        let locator = ScriptLocator::new(source.dir(), pattern);
        let stages = locator.stages()?;
        if stages.is_empty() {
            report::print_no_scripts(locator.pattern(), locator.dir());
            return Ok(RunOutcome::default());
        }

        let spawner = self
            .spawner
            .unwrap_or_else(|| Box::new(ShellSpawner::new(config.shell.clone())));
        let explainer = Explainer {
            prefix: &config.command_prefix,
            families: &config.exit_codes,
        };
        let executor = StageExecutor {
            spawner: spawner.as_ref(),
            env: &env,
            cwd: &config.project_dir,
            cancel: &self.cancel,
            timeout: config.script_timeout,
            capture_root: config.capture_root.as_deref(),
            show_warnings: config.show_warnings,
            explainer,
        };

        let mut outcome = RunOutcome::default();
        for stage in &stages {
            if let Some(signal) = self.cancel.signal() {
                outcome.interrupted = Some(signal);
                break;
            }

            let stage_outcome = executor.run_stage(stage, &config.forwarded_args);
            outcome.record(stage.number, &stage_outcome);

            match &stage_outcome {
                StageOutcome::Passed { .. } => {}
                StageOutcome::Failed { .. } => {
                    report::print_stage_failed(stage.number, &stage_outcome, explainer);
                    break;
                }
                StageOutcome::Interrupted { .. } => break,
            }
        }

        if let Some(signal) = outcome.interrupted {
            report::print_interrupted(signal);
        } else if outcome.is_success() {
            report::print_run_passed(outcome.stages_run.len(), outcome.scripts_run);
        }

        tracing::debug!(
            exit_code = outcome.exit_code(),
            stages = outcome.stages_run.len(),
            "run finished"
        );
        Ok(outcome)
    }
}

fn check_inputs(config: &RunConfig) -> Result<()> {
    if config.project_dir.as_os_str().is_empty() {
        return Err(BmkError::MissingInput {
            name: "project directory",
        });
    }
    if config.bundled_dir.as_os_str().is_empty() {
        return Err(BmkError::MissingInput {
            name: "stages directory",
        });
    }
    if config.command_prefix.trim().is_empty() {
        return Err(BmkError::MissingInput {
            name: "command prefix",
        });
    }
    Ok(())
}
