//! Warning extraction from passing parallel scripts
//!
//! Tools that succeed can still print warnings that would otherwise vanish
//! with the rest of the buffered output. Lines mentioning "warning" are
//! surfaced after the stage summary. Summary counts such as
//! `3 warnings generated` or `0 warnings` are skipped.
//!
//! The report is advisory only and never changes an exit code.

use colored::Colorize;
use regex::Regex;
use std::sync::OnceLock;

/// Warning lines from one passing script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptWarnings {
    pub script: String,
    pub lines: Vec<String>,
}

/// Warnings collected across a stage, in script order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningReport {
    pub scripts: Vec<ScriptWarnings>,
}

impl WarningReport {
    pub fn line_count(&self) -> usize {
        self.scripts.iter().map(|s| s.lines.len()).sum()
    }

    pub fn print(&self) {
        for entry in &self.scripts {
            println!(
                "  {} Warnings from {}:",
                "⚠".yellow().bold(),
                entry.script.bold()
            );
            for line in &entry.lines {
                println!("    {}", line.yellow());
            }
        }
    }
}

fn summary_count() -> Option<&'static Regex> {
    static SUMMARY: OnceLock<Option<Regex>> = OnceLock::new();
    SUMMARY
        .get_or_init(|| Regex::new(r"(?i)(^|[\s,(=])\d+\s+warnings?\b").ok())
        .as_ref()
}

/// True for a line worth surfacing as a warning
pub fn is_warning_line(line: &str) -> bool {
    line.to_lowercase().contains("warning")
        && !summary_count().is_some_and(|summary| summary.is_match(line))
}

/// Warning lines from one script's captured output
pub fn extract_warnings(output: &[String]) -> Vec<String> {
    output
        .iter()
        .filter(|line| is_warning_line(line))
        .map(|line| line.trim_end().to_string())
        .collect()
}

/// Scan passing scripts' output for warnings.
///
/// `passed` pairs each passing script's name with its captured output.
/// Returns `None` when nothing was found.
pub fn scan_for_warnings<'a, I>(passed: I) -> Option<WarningReport>
where
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    let scripts: Vec<ScriptWarnings> = passed
        .into_iter()
        .filter_map(|(script, output)| {
            let lines = extract_warnings(output);
            (!lines.is_empty()).then(|| ScriptWarnings {
                script: script.to_string(),
                lines,
            })
        })
        .collect();

    (!scripts.is_empty()).then_some(WarningReport { scripts })
}
