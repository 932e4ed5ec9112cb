//! Result types for stage and run execution

use std::time::Duration;

use crate::exit_codes;

/// Outcome of running one script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptResult {
    pub script: String,
    pub exit_code: i32,
    /// Combined stdout/stderr lines; only filled for parallel stages
    pub output: Vec<String>,
    pub duration: Duration,
    /// Whether the script was terminated for exceeding its timeout
    pub timed_out: bool,
}

impl ScriptResult {
    pub fn new(script: impl Into<String>, exit_code: i32, duration: Duration) -> Self {
        Self {
            script: script.into(),
            exit_code,
            output: Vec::new(),
            duration,
            timed_out: false,
        }
    }

    /// A script that never started
    pub fn launch_failed(script: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            exit_code: exit_codes::GENERAL_ERROR,
            output: vec![reason.into()],
            duration: Duration::ZERO,
            timed_out: false,
        }
    }

    pub fn with_output(mut self, output: Vec<String>) -> Self {
        self.output = output;
        self
    }

    pub fn passed(&self) -> bool {
        self.exit_code == exit_codes::SUCCESS
    }
}

/// Outcome of running one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Every script exited 0 (or the stage was empty)
    Passed { results: Vec<ScriptResult> },
    /// At least one script failed; all of them ran to completion
    Failed { results: Vec<ScriptResult> },
    /// A signal arrived; in-flight scripts were terminated
    Interrupted {
        signal: i32,
        results: Vec<ScriptResult>,
    },
}

impl StageOutcome {
    pub fn from_results(results: Vec<ScriptResult>) -> Self {
        if results.iter().all(ScriptResult::passed) {
            StageOutcome::Passed { results }
        } else {
            StageOutcome::Failed { results }
        }
    }

    pub fn results(&self) -> &[ScriptResult] {
        match self {
            StageOutcome::Passed { results }
            | StageOutcome::Failed { results }
            | StageOutcome::Interrupted { results, .. } => results,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StageOutcome::Passed { .. })
    }

    /// Failed scripts in discovery order, not completion order
    pub fn failures(&self) -> Vec<(String, i32)> {
        self.results()
            .iter()
            .filter(|r| !r.passed())
            .map(|r| (r.script.clone(), r.exit_code))
            .collect()
    }

    /// Representative exit code: 0, the first failure's code, or `128+N`
    pub fn exit_code(&self) -> i32 {
        match self {
            StageOutcome::Passed { .. } => exit_codes::SUCCESS,
            StageOutcome::Failed { .. } => exit_codes::aggregate(&self.failures()),
            StageOutcome::Interrupted { signal, .. } => exit_codes::from_signal(*signal),
        }
    }

    pub fn passed_count(&self) -> usize {
        self.results().iter().filter(|r| r.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results().iter().filter(|r| !r.passed()).count()
    }
}

/// Aggregate result of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Stage numbers visited, ascending
    pub stages_run: Vec<u32>,
    pub scripts_run: usize,
    pub failed_scripts: Vec<(String, i32)>,
    pub interrupted: Option<i32>,
}

impl RunOutcome {
    /// Fold one stage's outcome into the run
    pub fn record(&mut self, stage: u32, outcome: &StageOutcome) {
        self.stages_run.push(stage);
        self.scripts_run += outcome.results().len();
        self.failed_scripts.extend(outcome.failures());
        if let StageOutcome::Interrupted { signal, .. } = outcome {
            self.interrupted = Some(*signal);
        }
    }

    pub fn first_failure_exit_code(&self) -> Option<i32> {
        self.failed_scripts.first().map(|(_, code)| *code)
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == exit_codes::SUCCESS
    }

    /// Process exit code for this run
    pub fn exit_code(&self) -> i32 {
        if let Some(signal) = self.interrupted {
            return exit_codes::from_signal(signal);
        }
        if self.failed_scripts.is_empty() {
            exit_codes::SUCCESS
        } else {
            exit_codes::aggregate(&self.failed_scripts)
        }
    }
}
