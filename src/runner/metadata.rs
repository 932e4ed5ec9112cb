//! Package name lookup for the project under build

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Source of project metadata exposed to scripts
pub trait MetadataProvider: Send + Sync {
    /// The importable package name of the project, if one can be derived
    fn package_name(&self, project_dir: &Path) -> Option<String>;
}

/// Reads `pyproject.toml`, then `Cargo.toml`
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestMetadata;

impl MetadataProvider for ManifestMetadata {
    fn package_name(&self, project_dir: &Path) -> Option<String> {
        read_manifest(&project_dir.join("pyproject.toml"))
            .and_then(|doc| pyproject_package_name(&doc))
            .or_else(|| {
                read_manifest(&project_dir.join("Cargo.toml"))
                    .and_then(|doc| cargo_package_name(&doc))
            })
    }
}

fn read_manifest(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to parse manifest");
            None
        }
    }
}

/// Wheel package basename, then first entry point module, then project name
pub fn pyproject_package_name(doc: &toml::Value) -> Option<String> {
    let wheel_package = doc
        .get("tool")
        .and_then(|t| t.get("hatch"))
        .and_then(|h| h.get("build"))
        .and_then(|b| b.get("targets"))
        .and_then(|t| t.get("wheel"))
        .and_then(|w| w.get("packages"))
        .and_then(|p| p.as_array())
        .and_then(|packages| packages.first())
        .and_then(|first| first.as_str())
        .and_then(|path| Path::new(path).file_name())
        .map(|name| name.to_string_lossy().into_owned());
    if wheel_package.is_some() {
        return wheel_package;
    }

    let project = doc.get("project");

    let entry_point = project
        .and_then(|p| p.get("scripts"))
        .and_then(|s| s.as_table())
        .and_then(|scripts| {
            scripts.values().find_map(|target| {
                let (module, _) = target.as_str()?.split_once(':')?;
                module.split('.').next().map(str::to_string)
            })
        });
    if entry_point.is_some() {
        return entry_point;
    }

    project
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .filter(|name| !name.is_empty())
        .map(|name| name.replace('-', "_"))
}

pub fn cargo_package_name(doc: &toml::Value) -> Option<String> {
    doc.get("package")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .filter(|name| !name.is_empty())
        .map(|name| name.replace('-', "_"))
}

/// Package name for one run, computed at most once
pub struct PackageMetadata {
    project_dir: PathBuf,
    configured: Option<String>,
    provider: Box<dyn MetadataProvider>,
    cached: OnceLock<Option<String>>,
}

impl PackageMetadata {
    pub fn new(
        project_dir: impl Into<PathBuf>,
        configured: Option<String>,
        provider: Box<dyn MetadataProvider>,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            configured,
            provider,
            cached: OnceLock::new(),
        }
    }

    /// Configured name if set, else whatever the provider derives
    pub fn package_name(&self) -> Option<&str> {
        self.cached
            .get_or_init(|| {
                let name = self
                    .configured
                    .clone()
                    .or_else(|| self.provider.package_name(&self.project_dir));
                tracing::debug!(package_name = ?name, "resolved package name");
                name
            })
            .as_deref()
    }
}
