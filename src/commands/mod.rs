//! Subcommand implementations

pub mod custom;
pub mod stages;


use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{OutputFormat, RunConfig, Settings, SettingsLayer};

/// Flags shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub project_dir: Option<PathBuf>,
    pub stages_dir: Option<PathBuf>,
    pub override_dir: Option<PathBuf>,
    pub no_warnings: bool,
    pub human: bool,
    pub timeout_secs: Option<u64>,
}

impl RunOptions {
    /// The CLI settings layer; only flags actually given are set.
    ///
    /// Relative directory flags are resolved against `cwd`, the caller's
    /// working directory, not the project directory.
    pub fn settings_layer(&self, cwd: &Path) -> SettingsLayer {
        let resolve = |dir: &PathBuf| cwd.join(dir).display().to_string();
        SettingsLayer {
            stages_dir: self.stages_dir.as_ref().map(resolve),
            override_dir: self.override_dir.as_ref().map(resolve),
            show_warnings: self.no_warnings.then_some(false),
            output_format: self.human.then_some(OutputFormat::Text),
            script_timeout_secs: self.timeout_secs,
            ..Default::default()
        }
    }

    /// Project directory, defaulting to the current directory
    pub fn project_dir(&self) -> Result<PathBuf> {
        let cwd = current_dir()?;
        Ok(self.project_dir_in(&cwd))
    }

    fn project_dir_in(&self, cwd: &Path) -> PathBuf {
        match &self.project_dir {
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        }
    }

    /// Load all settings layers and build the config for one run
    pub fn run_config(&self, prefix: &str, args: Vec<String>) -> Result<RunConfig> {
        let cwd = current_dir()?;
        let project_dir = self.project_dir_in(&cwd);
        let settings = Settings::load(&project_dir, self.settings_layer(&cwd))?;
        Ok(RunConfig::from_settings(settings, &project_dir, prefix, args))
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to determine current directory")
}
