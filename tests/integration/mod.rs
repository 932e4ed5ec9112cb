//! Integration tests for the bmk binary
//!
//! These tests run the real `bmk` executable against throwaway projects
//! holding small bash scripts, and check exit codes, report output, and
//! process cleanup.

#[cfg(unix)]
pub mod custom_command;
pub mod helpers;
#[cfg(unix)]
pub mod interrupt;
#[cfg(unix)]
pub mod stage_runs;
#[cfg(unix)]
pub mod warning_report;
