//! Runner configuration
//!
//! [`Settings`] is what the layered config files and environment say.
//! [`RunConfig`] is the explicit value threaded through a single run; the
//! process environment is never mutated to carry it.

mod settings;


use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::exit_codes::FamilyExplanations;

pub use settings::{
    user_config_file, Settings, SettingsLayer, ENV_LAYER_PREFIX, PROJECT_CONFIG_FILE,
};

/// Name of both the bundled and the per-project scripts directory
pub const SCRIPTS_DIR_NAME: &str = "makescripts";

/// Output format preference handed to scripts as `BMK_OUTPUT_FORMAT`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "text" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

/// Script extension for this platform
pub fn default_script_extension() -> &'static str {
    if cfg!(windows) {
        "ps1"
    } else {
        "sh"
    }
}

/// Bundled scripts: `makescripts/` next to the executable
pub fn default_bundled_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SCRIPTS_DIR_NAME)))
}

/// Per-project overrides: `<project>/makescripts`
pub fn default_override_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(SCRIPTS_DIR_NAME)
}

/// Everything one run needs, resolved up front
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub project_dir: PathBuf,
    pub bundled_dir: PathBuf,
    pub override_dir: Option<PathBuf>,
    pub command_prefix: String,
    pub forwarded_args: Vec<String>,
    pub package_name: Option<String>,
    pub show_warnings: bool,
    pub output_format: OutputFormat,
    pub script_extension: String,
    /// Interpreter for `.sh` scripts
    pub shell: String,
    pub script_timeout: Option<Duration>,
    /// Parent for per-stage capture directories; system temp dir if unset
    pub capture_root: Option<PathBuf>,
    pub exit_codes: FamilyExplanations,
}

impl RunConfig {
    /// Config with defaults for everything but the required inputs
    pub fn new(
        project_dir: impl Into<PathBuf>,
        bundled_dir: impl Into<PathBuf>,
        command_prefix: impl Into<String>,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            bundled_dir: bundled_dir.into(),
            override_dir: None,
            command_prefix: command_prefix.into(),
            forwarded_args: Vec::new(),
            package_name: None,
            show_warnings: true,
            output_format: OutputFormat::default(),
            script_extension: default_script_extension().to_string(),
            shell: "bash".to_string(),
            script_timeout: None,
            capture_root: None,
            exit_codes: FamilyExplanations::new(),
        }
    }

    /// Build a run config from loaded settings.
    ///
    /// Relative directories in settings are taken relative to the project.
    /// Missing required inputs are left empty for the coordinator to reject.
    pub fn from_settings(
        settings: Settings,
        project_dir: &Path,
        command_prefix: &str,
        forwarded_args: Vec<String>,
    ) -> Self {
        let bundled_dir = settings
            .stages_dir
            .map(|dir| project_dir.join(dir))
            .or_else(default_bundled_dir)
            .unwrap_or_default();

        let override_dir = settings
            .override_dir
            .map(|dir| project_dir.join(dir))
            .unwrap_or_else(|| default_override_dir(project_dir));
        warn_if_outside(&override_dir, project_dir);

        Self {
            project_dir: project_dir.to_path_buf(),
            bundled_dir,
            override_dir: Some(override_dir),
            command_prefix: command_prefix.to_string(),
            forwarded_args,
            package_name: settings.package_name,
            show_warnings: settings.show_warnings,
            output_format: settings.output_format,
            script_extension: settings.script_extension,
            shell: settings.shell,
            script_timeout: settings.script_timeout,
            capture_root: None,
            exit_codes: settings.exit_codes,
        }
    }
}

/// Overrides outside the project tree are allowed, but worth flagging
fn warn_if_outside(override_dir: &Path, project_dir: &Path) {
    let (Ok(dir), Ok(project)) = (override_dir.canonicalize(), project_dir.canonicalize()) else {
        return;
    };
    if !dir.starts_with(&project) {
        tracing::warn!(
            override_dir = %dir.display(),
            project_dir = %project.display(),
            "override directory is outside the project tree"
        );
    }
}
