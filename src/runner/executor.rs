//! Running the scripts of one stage
//!
//! A single-script stage runs in the foreground with the runner's terminal.
//! A stage with several scripts launches all of them at once, each in its
//! own process group with output captured to a log file, and waits for
//! every one to finish before reporting. Nothing is cut short on failure;
//! only a cancel signal or a script timeout terminates children early.

use std::path::{Path, PathBuf};
use std::process::Child;
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

use super::cancel::CancelToken;
use super::capture::{self, CaptureDir};
use super::report::{self, Explainer};
use super::result::{ScriptResult, StageOutcome};
use super::spawner::{LaunchRequest, ScriptEnv, ScriptOutput, ScriptSpawner};
use crate::discovery::{ScriptDescriptor, Stage};
use crate::exit_codes;
use crate::process::{self, Scope};
use crate::warnings;

/// How often waiting threads check for cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How a wait on one child ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitEnd {
    Exited(i32),
    TimedOut,
    Cancelled(i32),
}

/// Executes stages for one run
pub struct StageExecutor<'a> {
    pub spawner: &'a dyn ScriptSpawner,
    pub env: &'a ScriptEnv,
    pub cwd: &'a Path,
    pub cancel: &'a CancelToken,
    pub timeout: Option<Duration>,
    pub capture_root: Option<&'a Path>,
    pub show_warnings: bool,
    pub explainer: Explainer<'a>,
}

impl StageExecutor<'_> {
    /// Run every script of `stage` and report the result.
    ///
    /// An empty stage passes without doing anything.
    pub fn run_stage(&self, stage: &Stage, args: &[String]) -> StageOutcome {
        if stage.scripts.is_empty() {
            return StageOutcome::Passed {
                results: Vec::new(),
            };
        }

        report::print_stage_header(stage);

        let outcome = if stage.is_parallel() {
            self.run_parallel(stage, args)
        } else {
            self.run_single(&stage.scripts[0], args)
        };

        tracing::debug!(
            stage = stage.number,
            passed = outcome.passed_count(),
            failed = outcome.failed_count(),
            "stage finished"
        );
        outcome
    }

    fn run_single(&self, script: &ScriptDescriptor, args: &[String]) -> StageOutcome {
        let start = Instant::now();
        let spawned = self.spawner.spawn(LaunchRequest {
            script,
            args,
            env: self.env,
            cwd: self.cwd,
            output: ScriptOutput::Inherit,
        });

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(script = %script.name(), error = %e, "failed to launch script");
                let result =
                    ScriptResult::launch_failed(script.name(), format!("failed to launch: {e}"));
                report::print_script_lines(std::slice::from_ref(&result), self.explainer);
                return StageOutcome::from_results(vec![result]);
            }
        };

        let end = wait_child(&mut child, Scope::Process, self.cancel, self.timeout);
        let result = script_result(script, end, start.elapsed());

        if let Some(signal) = self.cancel.signal() {
            return StageOutcome::Interrupted {
                signal,
                results: vec![result],
            };
        }

        report::print_script_lines(std::slice::from_ref(&result), self.explainer);
        StageOutcome::from_results(vec![result])
    }

    fn run_parallel(&self, stage: &Stage, args: &[String]) -> StageOutcome {
        let capture = match CaptureDir::new(self.capture_root, stage.number) {
            Ok(capture) => capture,
            Err(e) => {
                tracing::warn!(stage = stage.number, error = %e, "failed to create capture directory");
                let results: Vec<ScriptResult> = stage
                    .scripts
                    .iter()
                    .map(|s| {
                        ScriptResult::launch_failed(
                            s.name(),
                            format!("failed to create capture directory: {e}"),
                        )
                    })
                    .collect();
                report::print_script_lines(&results, self.explainer);
                report::print_failure_output(&results);
                return StageOutcome::from_results(results);
            }
        };

        let start = Instant::now();
        let mut launches: Vec<Launch> = stage
            .scripts
            .iter()
            .enumerate()
            .map(|(index, script)| self.launch_captured(&capture, index, script, args))
            .collect();

        let cancel = self.cancel;
        let timeout = self.timeout;
        let ends: Vec<Option<(WaitEnd, Duration)>> = thread::scope(|scope| {
            let waiters: Vec<_> = launches
                .iter_mut()
                .map(|launch| match launch {
                    Launch::Running { child, .. } => Some(scope.spawn(move || {
                        let end = wait_child(child, Scope::Group, cancel, timeout);
                        (end, start.elapsed())
                    })),
                    Launch::Failed(_) => None,
                })
                .collect();

            // Join in discovery order; every waiter runs to completion
            waiters
                .into_iter()
                .map(|waiter| {
                    waiter.map(|handle| {
                        handle.join().unwrap_or((
                            WaitEnd::Exited(exit_codes::GENERAL_ERROR),
                            start.elapsed(),
                        ))
                    })
                })
                .collect()
        });

        let results: Vec<ScriptResult> = stage
            .scripts
            .iter()
            .zip(launches)
            .zip(ends)
            .map(|((script, launch), end)| match (launch, end) {
                (Launch::Running { log, .. }, Some((end, elapsed))) => {
                    script_result(script, end, elapsed).with_output(capture::read_lines(&log))
                }
                (Launch::Failed(reason), _) => ScriptResult::launch_failed(script.name(), reason),
                (Launch::Running { .. }, None) => {
                    ScriptResult::launch_failed(script.name(), "script did not start")
                }
            })
            .collect();

        drop(capture);

        if let Some(signal) = self.cancel.signal() {
            return StageOutcome::Interrupted { signal, results };
        }

        report::print_script_lines(&results, self.explainer);

        if self.show_warnings {
            let passed = results
                .iter()
                .filter(|r| r.passed())
                .map(|r| (r.script.as_str(), r.output.as_slice()));
            if let Some(found) = warnings::scan_for_warnings(passed) {
                report::print_warnings(&found);
            }
        }

        report::print_failure_output(&results);
        StageOutcome::from_results(results)
    }

    fn launch_captured(
        &self,
        capture: &CaptureDir,
        index: usize,
        script: &ScriptDescriptor,
        args: &[String],
    ) -> Launch {
        let (log, file) = match capture.create_log(index, script) {
            Ok(opened) => opened,
            Err(e) => return Launch::Failed(format!("failed to create output log: {e}")),
        };

        match self.spawner.spawn(LaunchRequest {
            script,
            args,
            env: self.env,
            cwd: self.cwd,
            output: ScriptOutput::Capture(file),
        }) {
            Ok(child) => Launch::Running { child, log },
            Err(e) => {
                tracing::warn!(script = %script.name(), error = %e, "failed to launch script");
                Launch::Failed(format!("failed to launch: {e}"))
            }
        }
    }
}

/// A parallel script after the launch attempt
enum Launch {
    Running { child: Child, log: PathBuf },
    Failed(String),
}

fn script_result(script: &ScriptDescriptor, end: WaitEnd, elapsed: Duration) -> ScriptResult {
    match end {
        WaitEnd::Exited(code) => ScriptResult::new(script.name(), code, elapsed),
        WaitEnd::Cancelled(signal) => {
            ScriptResult::new(script.name(), exit_codes::from_signal(signal), elapsed)
        }
        WaitEnd::TimedOut => {
            let mut result = ScriptResult::new(script.name(), exit_codes::TIMEOUT, elapsed);
            result.timed_out = true;
            result
        }
    }
}

/// Wait for a child, terminating it on cancel or timeout.
fn wait_child(
    child: &mut Child,
    scope: Scope,
    cancel: &CancelToken,
    timeout: Option<Duration>,
) -> WaitEnd {
    let started = Instant::now();

    loop {
        if let Some(signal) = cancel.signal() {
            stop(child, scope);
            return WaitEnd::Cancelled(signal);
        }
        if timeout.is_some_and(|limit| started.elapsed() >= limit) {
            tracing::warn!(pid = child.id(), "script exceeded timeout, terminating");
            stop(child, scope);
            return WaitEnd::TimedOut;
        }

        match child.wait_timeout(POLL_INTERVAL) {
            Ok(Some(status)) => return WaitEnd::Exited(exit_codes::from_status(status)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(pid = child.id(), error = %e, "failed to wait for script");
                stop(child, scope);
                return WaitEnd::Exited(exit_codes::GENERAL_ERROR);
            }
        }
    }
}

fn stop(child: &mut Child, scope: Scope) {
    if let Err(e) = process::terminate(child, scope) {
        tracing::warn!(pid = child.id(), error = %e, "failed to terminate script");
    }
}
