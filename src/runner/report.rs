//! Terminal report for stages and runs

use colored::Colorize;

use super::result::{ScriptResult, StageOutcome};
use crate::discovery::{Stage, StagePattern};
use crate::exit_codes::{self, FamilyExplanations};
use crate::warnings::WarningReport;

/// Prefix and family table used to explain failure codes
#[derive(Debug, Clone, Copy)]
pub struct Explainer<'a> {
    pub prefix: &'a str,
    pub families: &'a FamilyExplanations,
}

impl Explainer<'_> {
    pub fn explain(&self, code: i32) -> String {
        exit_codes::explain_for(self.prefix, code, self.families)
    }
}

pub fn print_stage_header(stage: &Stage) {
    if stage.is_parallel() {
        println!(
            "{} Stage {}: running {} scripts in parallel",
            "→".cyan().bold(),
            stage.number,
            stage.scripts.len()
        );
    } else if let Some(script) = stage.scripts.first() {
        println!(
            "{} Stage {}: {}",
            "→".cyan().bold(),
            stage.number,
            script.name().bold()
        );
    }
}

/// One pass/fail line per script, in discovery order
pub fn print_script_lines(results: &[ScriptResult], explainer: Explainer<'_>) {
    for result in results {
        if result.passed() {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                result.script,
                format!("({:.1}s)", result.duration.as_secs_f64()).dimmed()
            );
        } else {
            println!(
                "  {} {} {}",
                "✗".red().bold(),
                result.script,
                format!(
                    "(exit {}: {})",
                    result.exit_code,
                    explainer.explain(result.exit_code)
                )
                .dimmed()
            );
        }
    }
}

pub fn print_warnings(report: &WarningReport) {
    println!();
    report.print();
}

/// Full captured output of each failing script
pub fn print_failure_output(results: &[ScriptResult]) {
    for result in results.iter().filter(|r| !r.passed()) {
        println!();
        println!(
            "{} {} {}",
            "──".red(),
            format!("Output from {}", result.script).bold(),
            format!("(exit {})", result.exit_code).red()
        );
        if result.output.is_empty() {
            println!("{}", "  (no output)".dimmed());
        }
        for line in &result.output {
            println!("{line}");
        }
    }
}

pub fn print_no_scripts(pattern: &StagePattern, dir: &std::path::Path) {
    println!(
        "{} No scripts found for prefix '{}' in {}",
        "⚠".yellow().bold(),
        pattern.prefix(),
        dir.display()
    );
    println!(
        "  {} Expected naming convention: {}",
        "→".dimmed(),
        pattern.example().bold()
    );
}

pub fn print_stage_failed(stage: u32, outcome: &StageOutcome, explainer: Explainer<'_>) {
    println!();
    println!("{}", "═".repeat(40).dimmed());
    println!(
        "{} Stage {} failed ({} of {} scripts)",
        "✗".red().bold(),
        stage,
        outcome.failed_count(),
        outcome.results().len()
    );
    for (script, code) in outcome.failures() {
        println!(
            "  {} {} exited {} ({})",
            "✗".red(),
            script,
            code,
            explainer.explain(code)
        );
    }
    println!("{}", "═".repeat(40).dimmed());
}

pub fn print_interrupted(signal: i32) {
    let code = exit_codes::from_signal(signal);
    println!();
    println!(
        "{} Interrupted ({}), stopped remaining stages",
        "⚠".yellow().bold(),
        exit_codes::explain(code)
    );
}

pub fn print_run_passed(stages: usize, scripts: usize) {
    println!();
    println!(
        "{} All {} stages passed ({} scripts)",
        "✓".green().bold(),
        stages,
        scripts
    );
}
