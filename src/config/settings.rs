//! Layered settings loading
//!
//! Layers, lowest to highest: built-in defaults, the user config file, the
//! project `bmk.toml`, `BMK___BMK__*` environment variables, CLI flags.
//! Each layer only overrides the keys it actually sets.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::OutputFormat;
use crate::error::{BmkError, Result};
use crate::exit_codes::FamilyExplanations;

/// Project-level settings file name
pub const PROJECT_CONFIG_FILE: &str = "bmk.toml";

/// Prefix for environment variables that map onto `[bmk]` keys
pub const ENV_LAYER_PREFIX: &str = "BMK___BMK__";

/// One layer of settings; unset keys defer to lower layers
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SettingsLayer {
    pub stages_dir: Option<String>,
    pub override_dir: Option<String>,
    pub package_name: Option<String>,
    pub show_warnings: Option<bool>,
    pub output_format: Option<OutputFormat>,
    pub script_extension: Option<String>,
    pub shell: Option<String>,
    pub script_timeout_secs: Option<u64>,
    /// Per-prefix exit code meanings: `[bmk.exit_codes.commit] "1" = "..."`
    pub exit_codes: HashMap<String, HashMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    bmk: SettingsLayer,
}

impl SettingsLayer {
    /// Parse the `[bmk]` table out of a TOML document
    pub fn from_toml(content: &str, path: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|source| BmkError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(file.bmk.normalized())
    }

    /// Load a layer from a file; a missing file is an empty layer
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| BmkError::io(format!("failed to read {}", path.display()), e))?;
        tracing::debug!(path = %path.display(), "loaded settings file");
        Self::from_toml(&content, path)
    }

    /// Build a layer from `BMK___BMK__<KEY>` variables.
    ///
    /// Unparseable boolean or integer values are ignored with a warning.
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_LAYER_PREFIX) else {
                continue;
            };
            match name.to_ascii_lowercase().as_str() {
                "stages_dir" => layer.stages_dir = Some(value),
                "override_dir" => layer.override_dir = Some(value),
                "package_name" => layer.package_name = Some(value),
                "show_warnings" => layer.show_warnings = parse_env_bool(&key, &value),
                "output_format" => layer.output_format = OutputFormat::parse(&value),
                "script_extension" => layer.script_extension = Some(value),
                "shell" => layer.shell = Some(value),
                "script_timeout_secs" => {
                    layer.script_timeout_secs = value.trim().parse().ok();
                    if layer.script_timeout_secs.is_none() {
                        tracing::warn!(%key, %value, "ignoring non-numeric timeout");
                    }
                }
                other => tracing::debug!(key = other, "ignoring unknown settings variable"),
            }
        }
        layer.normalized()
    }

    /// Overlay `over` on top of `self`
    pub fn merge(self, over: SettingsLayer) -> SettingsLayer {
        let mut exit_codes = self.exit_codes;
        for (prefix, codes) in over.exit_codes {
            exit_codes.entry(prefix).or_default().extend(codes);
        }

        SettingsLayer {
            stages_dir: over.stages_dir.or(self.stages_dir),
            override_dir: over.override_dir.or(self.override_dir),
            package_name: over.package_name.or(self.package_name),
            show_warnings: over.show_warnings.or(self.show_warnings),
            output_format: over.output_format.or(self.output_format),
            script_extension: over.script_extension.or(self.script_extension),
            shell: over.shell.or(self.shell),
            script_timeout_secs: over.script_timeout_secs.or(self.script_timeout_secs),
            exit_codes,
        }
    }

    /// Empty strings mean "unset"
    fn normalized(mut self) -> Self {
        for field in [
            &mut self.stages_dir,
            &mut self.override_dir,
            &mut self.package_name,
            &mut self.script_extension,
            &mut self.shell,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        self
    }
}

fn parse_env_bool(key: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(%key, %value, "ignoring non-boolean value");
            None
        }
    }
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub stages_dir: Option<PathBuf>,
    pub override_dir: Option<PathBuf>,
    pub package_name: Option<String>,
    pub show_warnings: bool,
    pub output_format: OutputFormat,
    pub script_extension: String,
    pub shell: String,
    pub script_timeout: Option<Duration>,
    pub exit_codes: FamilyExplanations,
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(SettingsLayer::default())
    }
}

impl Settings {
    /// Apply built-in defaults to whatever the layers left unset
    pub fn resolve(layer: SettingsLayer) -> Self {
        Self {
            stages_dir: layer.stages_dir.map(PathBuf::from),
            override_dir: layer.override_dir.map(PathBuf::from),
            package_name: layer.package_name,
            show_warnings: layer.show_warnings.unwrap_or(true),
            output_format: layer.output_format.unwrap_or_default(),
            script_extension: layer
                .script_extension
                .map(|ext| ext.trim_start_matches('.').to_string())
                .unwrap_or_else(|| super::default_script_extension().to_string()),
            shell: layer.shell.unwrap_or_else(|| "bash".to_string()),
            script_timeout: layer
                .script_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            exit_codes: parse_exit_codes(layer.exit_codes),
        }
    }

    /// Load every layer for a project, with `cli` on top
    pub fn load(project_dir: &Path, cli: SettingsLayer) -> Result<Self> {
        let mut layer = SettingsLayer::default();

        if let Some(user_file) = user_config_file() {
            layer = layer.merge(SettingsLayer::from_file(&user_file)?);
        }
        layer = layer.merge(SettingsLayer::from_file(
            &project_dir.join(PROJECT_CONFIG_FILE),
        )?);
        layer = layer.merge(SettingsLayer::from_env_vars(std::env::vars()));
        layer = layer.merge(cli);

        Ok(Self::resolve(layer))
    }
}

/// `<config_dir>/bmk/config.toml`, if the platform has a config dir
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bmk").join("config.toml"))
}

fn parse_exit_codes(raw: HashMap<String, HashMap<String, String>>) -> FamilyExplanations {
    raw.into_iter()
        .map(|(prefix, codes)| {
            let codes = codes
                .into_iter()
                .filter_map(|(code, meaning)| match code.trim().parse::<i32>() {
                    Ok(code) => Some((code, meaning)),
                    Err(_) => {
                        tracing::warn!(%prefix, %code, "ignoring non-numeric exit code key");
                        None
                    }
                })
                .collect();
            (prefix, codes)
        })
        .collect()
}
