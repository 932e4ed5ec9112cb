//! Stage script discovery
//!
//! Scripts are found by name alone: `<prefix>_<digits>_<description>.<ext>`.
//! Anything else in the directory is invisible to the runner.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{BmkError, Result};

/// Upper bound on stage digits; keeps the parsed number inside `u32`
const MAX_STAGE_DIGITS: usize = 6;

/// File-name matcher for one command prefix and script extension
#[derive(Debug, Clone)]
pub struct StagePattern {
    prefix: String,
    extension: String,
    regex: Regex,
}

impl StagePattern {
    /// Build the matcher. The prefix and extension are escaped, so regex
    /// metacharacters in either are matched literally.
    pub fn new(prefix: &str, extension: &str) -> Result<Self> {
        let extension = extension.trim_start_matches('.');
        let pattern = format!(
            r"^{}_(\d{{1,{MAX_STAGE_DIGITS}}})_.*\.{}$",
            regex::escape(prefix),
            regex::escape(extension)
        );
        let regex = Regex::new(&pattern)?;

        Ok(Self {
            prefix: prefix.to_string(),
            extension: extension.to_string(),
            regex,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Stage number for a file name, or `None` if the name does not match.
    /// Leading zeros are insignificant: `01` and `001` are both stage 1.
    pub fn stage_of(&self, file_name: &str) -> Option<u32> {
        let captures = self.regex.captures(file_name)?;
        captures.get(1)?.as_str().parse().ok()
    }

    /// Example name shown when nothing matches
    pub fn example(&self) -> String {
        format!("{}_01_description.{}", self.prefix, self.extension)
    }
}

/// One discoverable script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDescriptor {
    pub path: PathBuf,
    pub file_name: String,
    pub stage: u32,
}

impl ScriptDescriptor {
    /// Display identifier used in reports
    pub fn name(&self) -> &str {
        &self.file_name
    }
}

/// A numbered group of scripts that run together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub number: u32,
    pub scripts: Vec<ScriptDescriptor>,
}

impl Stage {
    pub fn is_parallel(&self) -> bool {
        self.scripts.len() > 1
    }
}

/// Finds stage scripts for one prefix in one directory
#[derive(Debug, Clone)]
pub struct ScriptLocator {
    dir: PathBuf,
    pattern: StagePattern,
}

impl ScriptLocator {
    pub fn new(dir: impl Into<PathBuf>, pattern: StagePattern) -> Self {
        Self {
            dir: dir.into(),
            pattern,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pattern(&self) -> &StagePattern {
        &self.pattern
    }

    /// All matching scripts, ordered by stage number then file name.
    ///
    /// A missing directory yields an empty list; the caller decides whether
    /// that means "nothing to run".
    pub fn scripts(&self) -> Result<Vec<ScriptDescriptor>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(BmkError::io(
                    format!("failed to read stages directory {}", self.dir.display()),
                    e,
                ))
            }
        };

        let mut scripts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                BmkError::io(format!("failed to list {}", self.dir.display()), e)
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(stage) = self.pattern.stage_of(file_name) {
                scripts.push(ScriptDescriptor {
                    file_name: file_name.to_string(),
                    path,
                    stage,
                });
            }
        }

        scripts.sort_by(|a, b| (a.stage, &a.file_name).cmp(&(b.stage, &b.file_name)));
        Ok(scripts)
    }

    pub fn has_scripts(&self) -> Result<bool> {
        Ok(!self.scripts()?.is_empty())
    }

    /// Distinct stage numbers, ascending
    pub fn discover_stages(&self) -> Result<BTreeSet<u32>> {
        Ok(self.scripts()?.into_iter().map(|s| s.stage).collect())
    }

    /// Scripts belonging to one stage; empty if the stage is absent
    pub fn scripts_for_stage(&self, stage: u32) -> Result<Vec<ScriptDescriptor>> {
        Ok(self
            .scripts()?
            .into_iter()
            .filter(|s| s.stage == stage)
            .collect())
    }

    /// Scripts grouped into stages, ascending by number
    pub fn stages(&self) -> Result<Vec<Stage>> {
        Ok(group_by_stage(self.scripts()?))
    }
}

/// Group scripts by stage number, preserving their relative order
pub fn group_by_stage(scripts: Vec<ScriptDescriptor>) -> Vec<Stage> {
    let mut grouped: BTreeMap<u32, Vec<ScriptDescriptor>> = BTreeMap::new();
    for script in scripts {
        grouped.entry(script.stage).or_default().push(script);
    }

    grouped
        .into_iter()
        .map(|(number, scripts)| Stage { number, scripts })
        .collect()
}
